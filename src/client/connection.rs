//! Module `connection`
//!
//! Defines `FtpConnection`, the owned handle for one control-channel session,
//! and the command/reply exchange on top of it.

use log::{debug, info, warn};
use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

use crate::client::stream::NetStream;
use crate::client::tls::TlsContext;
use crate::error::ClientError;
use crate::protocol::parser::{is_final_line, parse_reply_code};
use crate::protocol::responses::READY;
use crate::protocol::{Command, Reply, is_continuation_line};

/// Reply code 120: service ready in nnn minutes, a 220 follows.
const READY_SOON: u16 = 120;

/// Longest reply line accepted, terminator included.
const MAX_REPLY_LINE: u64 = 8192;

/// Runs an I/O future under `timeout`, translating both failure kinds.
pub(crate) async fn timed<T, F>(timeout: Duration, context: &str, future: F) -> Result<T, ClientError>
where
    F: Future<Output = io::Result<T>>,
{
    match tokio::time::timeout(timeout, future).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(ClientError::io(context, e)),
        Err(_) => Err(ClientError::io(
            context,
            io::Error::new(io::ErrorKind::TimedOut, "operation timed out"),
        )),
    }
}

/// One open control connection.
///
/// The handle is not `Clone`: exactly one owner issues commands, one at a
/// time, and `Client::close` consumes it.
///
/// A transport failure in the middle of an exchange leaves the reply stream
/// at an unknown position. The connection is then marked broken and every
/// later command fails without touching the socket.
#[derive(Debug)]
pub struct FtpConnection {
    control: BufReader<NetStream>,
    host: String,
    peer: SocketAddr,
    local: SocketAddr,
    timeout: Duration,
    passive: bool,
    use_pasv_address: bool,
    tls: Option<TlsContext>,
    protected: bool,
    broken: bool,
}

impl FtpConnection {
    /// Opens the TCP connection and consumes the server greeting.
    pub(crate) async fn open(host: &str, port: u16, timeout: Duration) -> Result<Self, ClientError> {
        info!("Connecting to {}:{}", host, port);
        let stream = timed(
            timeout,
            &format!("Unable to connect to {}:{}", host, port),
            TcpStream::connect((host, port)),
        )
        .await?;

        let peer = stream.peer_addr()?;
        let local = stream.local_addr()?;
        let mut connection = Self {
            control: BufReader::new(NetStream::Plain(stream)),
            host: host.to_string(),
            peer,
            local,
            timeout,
            passive: false,
            use_pasv_address: true,
            tls: None,
            protected: false,
            broken: false,
        };

        // One deadline for the whole greeting, however many 120 lines precede the 220.
        let greeting = match tokio::time::timeout(timeout, connection.read_greeting()).await {
            Ok(greeting) => greeting?,
            Err(_) => {
                return Err(ClientError::io(
                    "Server did not send a ready greeting",
                    io::Error::new(io::ErrorKind::TimedOut, "operation timed out"),
                ));
            }
        };
        if !greeting.is(READY) {
            return Err(ClientError::unexpected_reply(
                "Server did not send a ready greeting",
                greeting.into_lines(),
            ));
        }

        debug!("Control connection established with {}", peer);
        Ok(connection)
    }

    async fn read_greeting(&mut self) -> Result<Reply, ClientError> {
        let mut greeting = self.read_reply().await?;
        while greeting.is(READY_SOON) {
            greeting = self.read_reply().await?;
        }
        Ok(greeting)
    }

    /// Upgrades the control channel to TLS. Called after `AUTH TLS` succeeded.
    pub(crate) async fn into_secure(self, tls: TlsContext) -> Result<Self, ClientError> {
        let Self {
            control,
            host,
            peer,
            local,
            timeout,
            passive,
            use_pasv_address,
            ..
        } = self;

        let tcp = match control.into_inner() {
            NetStream::Plain(tcp) => tcp,
            NetStream::Tls(_) => return Err(ClientError::new("Connection is already secured")),
        };
        let secured = tls.handshake(tcp, timeout).await?;
        info!("Control connection to {} secured with TLS", peer);

        Ok(Self {
            control: BufReader::new(NetStream::Tls(Box::new(secured))),
            host,
            peer,
            local,
            timeout,
            passive,
            use_pasv_address,
            tls: Some(tls),
            protected: false,
            broken: false,
        })
    }

    // --------------------
    // Command exchange
    // --------------------

    pub(crate) async fn send(&mut self, command: &Command) -> Result<(), ClientError> {
        if self.broken {
            return Err(ClientError::new(format!(
                "Cannot send {}: connection to {} is out of sync",
                command.log_form(),
                self.peer
            )));
        }

        debug!("[{}] > {}", self.peer, command.log_form());
        let line = format!("{}\r\n", command);
        let context = format!("Failed to send {}", command.log_form());
        let stream = self.control.get_mut();
        let result = match timed(self.timeout, &context, stream.write_all(line.as_bytes())).await {
            Ok(()) => timed(self.timeout, &context, stream.flush()).await,
            Err(e) => Err(e),
        };
        self.check(result)
    }

    /// Reads one complete reply, following multi-line continuations.
    pub(crate) async fn read_reply(&mut self) -> Result<Reply, ClientError> {
        let first = self.read_line().await?;
        let mut lines = vec![first];

        if is_continuation_line(&lines[0]) {
            let code = parse_reply_code(&lines[0]).unwrap_or(0);
            loop {
                let line = self.read_line().await?;
                let done = is_final_line(code, &line);
                lines.push(line);
                if done {
                    break;
                }
            }
        }

        Ok(Reply::from_lines(lines))
    }

    async fn read_line(&mut self) -> Result<String, ClientError> {
        let mut buf = Vec::new();
        let result = timed(
            self.timeout,
            "Failed to read server reply",
            (&mut self.control).take(MAX_REPLY_LINE).read_until(b'\n', &mut buf),
        )
        .await;
        let n = self.check(result)?;

        if n == 0 {
            self.broken = true;
            return Err(ClientError::io(
                "Failed to read server reply",
                io::Error::new(io::ErrorKind::ConnectionAborted, "server closed the connection"),
            ));
        }
        if buf.last() != Some(&b'\n') {
            self.broken = true;
            return Err(ClientError::io(
                "Failed to read server reply",
                io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("reply line longer than {} bytes", MAX_REPLY_LINE),
                ),
            ));
        }

        let line = String::from_utf8_lossy(&buf)
            .trim_end_matches(['\r', '\n'])
            .to_string();
        debug!("[{}] < {}", self.peer, line);
        Ok(line)
    }

    pub(crate) async fn execute(&mut self, command: Command) -> Result<Reply, ClientError> {
        self.send(&command).await?;
        self.read_reply().await
    }

    /// Sends `command` and requires the reply code to be one of `codes`.
    pub(crate) async fn expect(&mut self, command: Command, codes: &[u16]) -> Result<Reply, ClientError> {
        self.send(&command).await?;
        self.expect_reply(&command.log_form(), codes).await
    }

    /// Reads the next reply and requires its code to be one of `codes`.
    pub(crate) async fn expect_reply(&mut self, context: &str, codes: &[u16]) -> Result<Reply, ClientError> {
        let reply = self.read_reply().await?;
        if reply.is_any(codes) {
            Ok(reply)
        } else {
            Err(ClientError::unexpected_reply(
                format!("{} rejected", context),
                reply.into_lines(),
            ))
        }
    }

    /// Marks the connection broken when `result` is a failure.
    pub(crate) fn check<T>(&mut self, result: Result<T, ClientError>) -> Result<T, ClientError> {
        if result.is_err() && !self.broken {
            warn!("Connection to {} is out of sync, refusing further commands", self.peer);
            self.broken = true;
        }
        result
    }

    /// Best-effort shutdown of the control stream.
    pub(crate) async fn shutdown(&mut self) {
        if let Err(e) = self.control.get_mut().shutdown().await {
            debug!("Ignoring shutdown error on {}: {}", self.peer, e);
        }
    }

    /// Wraps a fresh data connection in TLS when `PROT P` is in effect.
    pub(crate) async fn wrap_data(&mut self, stream: TcpStream) -> Result<NetStream, ClientError> {
        match (&self.tls, self.protected) {
            (Some(tls), true) => {
                let secured = tls.handshake(stream, self.timeout).await?;
                Ok(NetStream::Tls(Box::new(secured)))
            }
            _ => Ok(NetStream::Plain(stream)),
        }
    }

    // --------------------
    // Getter methods
    // --------------------

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local
    }

    /// Timeout applied to each reply read and data connection.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn is_passive(&self) -> bool {
        self.passive
    }

    pub fn uses_pasv_address(&self) -> bool {
        self.use_pasv_address
    }

    pub fn is_secure(&self) -> bool {
        self.control.get_ref().is_tls()
    }

    pub fn is_protected(&self) -> bool {
        self.protected
    }

    /// Whether an interrupted exchange has desynchronized the control channel.
    pub fn is_broken(&self) -> bool {
        self.broken
    }

    // --------------------
    // Setter methods
    // --------------------

    pub(crate) fn set_passive(&mut self, passive: bool) {
        self.passive = passive;
    }

    pub(crate) fn set_use_pasv_address(&mut self, use_pasv_address: bool) {
        self.use_pasv_address = use_pasv_address;
    }

    pub(crate) fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    pub(crate) fn set_protected(&mut self, protected: bool) {
        self.protected = protected;
    }
}
