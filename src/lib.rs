//! RAX FTP Connect
//!
//! Bootstraps FTP control connections (connect, login, UTF-8, passive mode)
//! with typed errors and failure-path cleanup, and checks whether an open
//! connection is still alive.

pub mod checker;
pub mod client;
pub mod config;
pub mod error;
pub mod options;
pub mod protocol;
pub mod provider;

pub use checker::{ConnectivityChecker, NoopCommandConnectivityChecker, RawListConnectivityChecker};
pub use client::{Client, FtpClient, FtpConnection};
pub use error::{ClientError, ConnectionError};
pub use options::{ConnectionOptions, IgnorePassiveAddress};
pub use provider::{ConnectionProvider, FtpConnectionProvider};
