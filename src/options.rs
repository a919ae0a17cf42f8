//! Connection options
//!
//! Immutable description of one FTP target. Built once per logical target,
//! either in code through the `with_*` methods or deserialized from the
//! `[connection]` table of the configuration file.

use serde::Deserialize;
use std::fmt;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 21;
pub const DEFAULT_TIMEOUT_SECS: u64 = 90;

/// Whether the address announced in a PASV reply should be ignored.
///
/// `Unset` leaves the client's own default untouched, which is different
/// from explicitly asking for `false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "Option<bool>")]
pub enum IgnorePassiveAddress {
    #[default]
    Unset,
    Set(bool),
}

impl IgnorePassiveAddress {
    pub fn as_option(self) -> Option<bool> {
        match self {
            IgnorePassiveAddress::Unset => None,
            IgnorePassiveAddress::Set(ignore) => Some(ignore),
        }
    }
}

impl From<Option<bool>> for IgnorePassiveAddress {
    fn from(value: Option<bool>) -> Self {
        match value {
            Some(ignore) => IgnorePassiveAddress::Set(ignore),
            None => IgnorePassiveAddress::Unset,
        }
    }
}

/// Target host, credentials and control-connection settings.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct ConnectionOptions {
    host: String,
    #[serde(default = "default_port")]
    port: u16,
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
    #[serde(default = "default_timeout")]
    timeout: u64,
    #[serde(default)]
    ssl: bool,
    #[serde(default)]
    utf8: bool,
    #[serde(default = "default_passive")]
    passive: bool,
    #[serde(default)]
    ignore_passive_address: IgnorePassiveAddress,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_passive() -> bool {
    true
}

impl ConnectionOptions {
    pub fn new(
        host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_PORT,
            username: username.into(),
            password: password.into(),
            timeout: DEFAULT_TIMEOUT_SECS,
            ssl: false,
            utf8: false,
            passive: true,
            ignore_passive_address: IgnorePassiveAddress::Unset,
        }
    }

    // --------------------
    // Builder methods
    // --------------------

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Connect timeout in seconds.
    pub fn with_timeout(mut self, timeout: u64) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_ssl(mut self, ssl: bool) -> Self {
        self.ssl = ssl;
        self
    }

    pub fn with_utf8(mut self, utf8: bool) -> Self {
        self.utf8 = utf8;
        self
    }

    pub fn with_passive(mut self, passive: bool) -> Self {
        self.passive = passive;
        self
    }

    pub fn with_ignore_passive_address(mut self, ignore: bool) -> Self {
        self.ignore_passive_address = IgnorePassiveAddress::Set(ignore);
        self
    }

    // --------------------
    // Getter methods
    // --------------------

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    /// Connect timeout in seconds.
    pub fn timeout(&self) -> u64 {
        self.timeout
    }

    pub fn timeout_duration(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    pub fn ssl(&self) -> bool {
        self.ssl
    }

    pub fn utf8(&self) -> bool {
        self.utf8
    }

    pub fn passive(&self) -> bool {
        self.passive
    }

    pub fn ignore_passive_address(&self) -> IgnorePassiveAddress {
        self.ignore_passive_address
    }

    /// `host:port`, for logging and socket resolution.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl fmt::Debug for ConnectionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionOptions")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"****")
            .field("timeout", &self.timeout)
            .field("ssl", &self.ssl)
            .field("utf8", &self.utf8)
            .field("passive", &self.passive)
            .field("ignore_passive_address", &self.ignore_passive_address)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_options_use_reference_defaults() {
        let options = ConnectionOptions::new("ftp.example.com", "u", "p");
        assert_eq!(options.port(), 21);
        assert_eq!(options.timeout(), 90);
        assert!(!options.ssl());
        assert!(!options.utf8());
        assert!(options.passive());
        assert_eq!(options.ignore_passive_address(), IgnorePassiveAddress::Unset);
        assert_eq!(options.addr(), "ftp.example.com:21");
    }

    #[test]
    fn builder_sets_every_field() {
        let options = ConnectionOptions::new("h", "u", "p")
            .with_port(2121)
            .with_timeout(5)
            .with_ssl(true)
            .with_utf8(true)
            .with_passive(false)
            .with_ignore_passive_address(false);

        assert_eq!(options.port(), 2121);
        assert_eq!(options.timeout_duration(), Duration::from_secs(5));
        assert!(options.ssl());
        assert!(options.utf8());
        assert!(!options.passive());
        assert_eq!(options.ignore_passive_address().as_option(), Some(false));
    }

    #[test]
    fn tri_state_distinguishes_unset_from_false() {
        assert_eq!(IgnorePassiveAddress::from(None), IgnorePassiveAddress::Unset);
        assert_eq!(
            IgnorePassiveAddress::from(Some(false)),
            IgnorePassiveAddress::Set(false)
        );
        assert_ne!(IgnorePassiveAddress::Unset, IgnorePassiveAddress::Set(false));
    }

    #[test]
    fn debug_output_hides_password() {
        let options = ConnectionOptions::new("h", "u", "hunter2");
        let rendered = format!("{:?}", options);
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("****"));
    }
}
