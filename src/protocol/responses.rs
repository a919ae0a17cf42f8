//! FTP Response handling
//!
//! Reply codes the client expects, and the reply type read off the
//! control connection.

use crate::protocol::parser::parse_reply_code;

/// Standard FTP response codes
pub const DATA_CONNECTION_OPEN: u16 = 125;
pub const OPENING_DATA_CONNECTION: u16 = 150;
pub const OK: u16 = 200;
pub const SUPERFLUOUS: u16 = 202;
pub const FILE_STATUS: u16 = 213;
pub const READY: u16 = 220;
pub const CLOSING: u16 = 221;
pub const TRANSFER_COMPLETE: u16 = 226;
pub const PASSIVE_MODE: u16 = 227;
pub const EXTENDED_PASSIVE_MODE: u16 = 229;
pub const LOGIN_SUCCESS: u16 = 230;
pub const AUTH_OK: u16 = 234;
pub const FILE_ACTION_OK: u16 = 250;
pub const PATH_CREATED: u16 = 257;
pub const PASSWORD_REQUIRED: u16 = 331;
pub const PENDING_FURTHER_INFO: u16 = 350;

/// A complete (possibly multi-line) server reply.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub code: u16,
    pub lines: Vec<String>,
}

impl Reply {
    /// Builds a reply from its raw lines. The code is taken from the last line.
    pub fn from_lines(lines: Vec<String>) -> Self {
        let code = lines
            .last()
            .and_then(|line| parse_reply_code(line))
            .unwrap_or(0);
        Self { code, lines }
    }

    pub fn is(&self, code: u16) -> bool {
        self.code == code
    }

    pub fn is_any(&self, codes: &[u16]) -> bool {
        codes.contains(&self.code)
    }

    /// Last line of the reply, where the final status text lives.
    pub fn last_line(&self) -> &str {
        self.lines.last().map(String::as_str).unwrap_or("")
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }
}
