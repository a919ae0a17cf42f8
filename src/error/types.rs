//! Error types
//!
//! `ClientError` is the unstructured failure of a single command client call.
//! `ConnectionError` is the taxonomy the connection provider reports; client
//! errors are always translated into it and never surfaced raw.

use std::fmt;
use std::io;

/// Failure of a single primitive client call.
#[derive(Debug)]
pub struct ClientError {
    message: String,
    reply: Vec<String>,
    source: Option<io::Error>,
}

impl ClientError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            reply: Vec::new(),
            source: None,
        }
    }

    /// The server answered, but not with the expected reply code.
    pub fn unexpected_reply(message: impl Into<String>, reply: Vec<String>) -> Self {
        Self {
            message: message.into(),
            reply,
            source: None,
        }
    }

    pub fn io(message: impl Into<String>, source: io::Error) -> Self {
        Self {
            message: message.into(),
            reply: Vec::new(),
            source: Some(source),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Reply lines received from the server, empty for transport failures.
    pub fn reply(&self) -> &[String] {
        &self.reply
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(last) = self.reply.last() {
            write!(f, " (server replied: {})", last)?;
        }
        if let Some(source) = &self.source {
            write!(f, ": {}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

impl From<io::Error> for ClientError {
    fn from(error: io::Error) -> Self {
        ClientError::io("I/O error on FTP connection", error)
    }
}

/// Errors raised while creating a connection.
///
/// Every variant is fatal to the attempt. Nothing in this crate retries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionError {
    ConnectFailure { host: String, port: u16, ssl: bool },
    AuthFailure { host: String, port: u16, username: String },
    Utf8NegotiationFailure { host: String, port: u16 },
    OptionSetFailure { option: String },
    PassiveModeFailure { host: String, port: u16 },
}

impl fmt::Display for ConnectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionError::ConnectFailure { host, port, ssl } => write!(
                f,
                "Unable to connect to host {} at port {} (ssl: {})",
                host, port, ssl
            ),
            ConnectionError::AuthFailure {
                host,
                port,
                username,
            } => write!(
                f,
                "Unable to login/authenticate as {} on {}::{}",
                username, host, port
            ),
            ConnectionError::Utf8NegotiationFailure { host, port } => {
                write!(f, "Could not set UTF-8 mode for connection: {}::{}", host, port)
            }
            ConnectionError::OptionSetFailure { option } => {
                write!(f, "Unable to set FTP option {}", option)
            }
            ConnectionError::PassiveModeFailure { host, port } => write!(
                f,
                "Could not set passive mode for connection: {}::{}",
                host, port
            ),
        }
    }
}

impl std::error::Error for ConnectionError {}
