//! Command client
//!
//! The `Client` trait is the verb-level capability set the connection
//! provider and connectivity checkers are written against: one call per FTP
//! command, each either succeeding with a value or failing with a generic
//! `ClientError`. `FtpClient` implements it over tokio TCP and rustls.

pub mod connection;
pub mod data_channel;
pub mod ftp;
pub mod stream;
pub mod tls;

#[cfg(test)]
pub(crate) mod mock;

use async_trait::async_trait;
use std::fmt;
use std::time::Duration;

use crate::error::ClientError;

pub use connection::FtpConnection;
pub use ftp::FtpClient;

/// Options that can be changed on an open connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FtpOption {
    /// Whether the address announced in a PASV reply is used for data
    /// connections (`true`) or replaced by the control peer's IP (`false`).
    UsePasvAddress,
    /// Timeout for replies and data connections, in seconds.
    TimeoutSec,
}

impl FtpOption {
    pub fn name(self) -> &'static str {
        match self {
            FtpOption::UsePasvAddress => "USEPASVADDRESS",
            FtpOption::TimeoutSec => "TIMEOUT_SEC",
        }
    }
}

impl fmt::Display for FtpOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionValue {
    Bool(bool),
    Seconds(u64),
}

/// Primitive FTP verbs over one control connection.
///
/// Every method that talks to the server takes the connection by `&mut`,
/// so a single owner can only have one command in flight. `close` consumes
/// the handle.
#[async_trait]
pub trait Client: Send + Sync {
    type Connection: Send;

    async fn connect(
        &self,
        host: &str,
        port: u16,
        timeout: Duration,
    ) -> Result<Self::Connection, ClientError>;

    /// Explicit FTPS: connects, then upgrades with `AUTH TLS`.
    async fn ssl_connect(
        &self,
        host: &str,
        port: u16,
        timeout: Duration,
    ) -> Result<Self::Connection, ClientError>;

    async fn login(
        &self,
        connection: &mut Self::Connection,
        username: &str,
        password: &str,
    ) -> Result<(), ClientError>;

    /// Sends `command` verbatim and returns the reply lines, whatever the code.
    async fn raw(
        &self,
        connection: &mut Self::Connection,
        command: &str,
    ) -> Result<Vec<String>, ClientError>;

    /// Unparsed LIST output for `directory`.
    async fn rawlist(
        &self,
        connection: &mut Self::Connection,
        directory: &str,
        recursive: bool,
    ) -> Result<Vec<String>, ClientError>;

    /// Whether `option` is available on this client at all.
    fn supports_option(&self, option: FtpOption) -> bool;

    fn set_option(
        &self,
        connection: &mut Self::Connection,
        option: FtpOption,
        value: OptionValue,
    ) -> Result<(), ClientError>;

    async fn pasv(&self, connection: &mut Self::Connection, passive: bool) -> Result<(), ClientError>;

    async fn close(&self, connection: Self::Connection) -> Result<(), ClientError>;

    async fn chdir(&self, connection: &mut Self::Connection, directory: &str) -> Result<(), ClientError>;

    /// Creates `directory` and returns the path the server reports.
    async fn mkdir(&self, connection: &mut Self::Connection, directory: &str) -> Result<String, ClientError>;

    async fn rmdir(&self, connection: &mut Self::Connection, directory: &str) -> Result<(), ClientError>;

    async fn delete(&self, connection: &mut Self::Connection, path: &str) -> Result<(), ClientError>;

    async fn rename(&self, connection: &mut Self::Connection, old: &str, new: &str) -> Result<(), ClientError>;

    async fn size(&self, connection: &mut Self::Connection, remote: &str) -> Result<u64, ClientError>;

    /// Last modification time of `remote` as a unix timestamp.
    async fn mdtm(&self, connection: &mut Self::Connection, remote: &str) -> Result<i64, ClientError>;

    async fn chmod(&self, connection: &mut Self::Connection, mode: u32, filename: &str) -> Result<u32, ClientError>;
}
