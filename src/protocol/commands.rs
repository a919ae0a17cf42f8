//! Module `commands`
//!
//! Defines the FTP commands the client issues and their wire form.

use std::fmt;

/// An FTP command sent over the control connection.
///
/// `Display` renders the wire form without the trailing CRLF.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    USER(String),
    PASS(String),
    AUTH(String), // Security mechanism, e.g. TLS
    PBSZ(u32),    // Protection buffer size
    PROT(char),   // Data channel protection level
    PASV,
    EPSV,
    PORT(String), // h1,h2,h3,h4,p1,p2
    EPRT(String), // |af|addr|port|
    LIST { path: String, recursive: bool },
    CWD(String),
    MKD(String),
    RMD(String),
    DELE(String),
    RNFR(String),
    RNTO(String),
    SIZE(String),
    MDTM(String),
    SITE(String),
    NOOP,
    QUIT,
    /// Arbitrary command text, sent verbatim.
    Raw(String),
}

impl Command {
    /// Wire form with credentials masked, for logging.
    pub fn log_form(&self) -> String {
        match self {
            Command::PASS(_) => "PASS ****".to_string(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::USER(user) => write!(f, "USER {}", user),
            Command::PASS(pass) => write!(f, "PASS {}", pass),
            Command::AUTH(mechanism) => write!(f, "AUTH {}", mechanism),
            Command::PBSZ(size) => write!(f, "PBSZ {}", size),
            Command::PROT(level) => write!(f, "PROT {}", level),
            Command::PASV => write!(f, "PASV"),
            Command::EPSV => write!(f, "EPSV"),
            Command::PORT(arg) => write!(f, "PORT {}", arg),
            Command::EPRT(arg) => write!(f, "EPRT {}", arg),
            Command::LIST { path, recursive } => {
                if *recursive {
                    write!(f, "LIST -R {}", path)
                } else {
                    write!(f, "LIST {}", path)
                }
            }
            Command::CWD(dir) => write!(f, "CWD {}", dir),
            Command::MKD(dir) => write!(f, "MKD {}", dir),
            Command::RMD(dir) => write!(f, "RMD {}", dir),
            Command::DELE(path) => write!(f, "DELE {}", path),
            Command::RNFR(path) => write!(f, "RNFR {}", path),
            Command::RNTO(path) => write!(f, "RNTO {}", path),
            Command::SIZE(path) => write!(f, "SIZE {}", path),
            Command::MDTM(path) => write!(f, "MDTM {}", path),
            Command::SITE(arg) => write!(f, "SITE {}", arg),
            Command::NOOP => write!(f, "NOOP"),
            Command::QUIT => write!(f, "QUIT"),
            Command::Raw(text) => write!(f, "{}", text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_renders_recursive_flag() {
        let plain = Command::LIST { path: "./".into(), recursive: false };
        let recursive = Command::LIST { path: "pub".into(), recursive: true };
        assert_eq!(plain.to_string(), "LIST ./");
        assert_eq!(recursive.to_string(), "LIST -R pub");
    }

    #[test]
    fn password_is_masked_in_log_form() {
        let cmd = Command::PASS("secret".into());
        assert_eq!(cmd.to_string(), "PASS secret");
        assert_eq!(cmd.log_form(), "PASS ****");
        assert_eq!(Command::USER("u".into()).log_form(), "USER u");
    }

    #[test]
    fn raw_is_sent_verbatim() {
        assert_eq!(Command::Raw("OPTS UTF8 ON".into()).to_string(), "OPTS UTF8 ON");
        assert_eq!(Command::PROT('P').to_string(), "PROT P");
    }
}
