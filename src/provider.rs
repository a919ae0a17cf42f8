//! Connection provider
//!
//! Runs the control-connection handshake: open the transport, authenticate,
//! negotiate UTF-8, apply the passive-address option and set passive mode.
//! Steps run strictly in that order, each gated on the previous one. Any
//! failure after the transport is open closes the connection before the
//! typed error is returned.

use async_trait::async_trait;
use log::{debug, info, warn};

use crate::client::{Client, FtpClient, FtpOption, OptionValue};
use crate::error::ConnectionError;
use crate::options::ConnectionOptions;

const ENABLE_UTF8: &str = "OPTS UTF8 ON";

/// Produces live, authenticated and configured connections.
#[async_trait]
pub trait ConnectionProvider: Send + Sync {
    type Connection: Send;

    async fn create_connection(
        &self,
        options: &ConnectionOptions,
    ) -> Result<Self::Connection, ConnectionError>;
}

/// Connection provider driving a `Client`.
pub struct FtpConnectionProvider<C: Client = FtpClient> {
    client: C,
}

impl FtpConnectionProvider<FtpClient> {
    pub fn new() -> Self {
        Self::with_client(FtpClient::new())
    }
}

impl Default for FtpConnectionProvider<FtpClient> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Client> FtpConnectionProvider<C> {
    pub fn with_client(client: C) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    async fn open_transport(
        &self,
        options: &ConnectionOptions,
    ) -> Result<C::Connection, ConnectionError> {
        let (host, port, timeout) = (options.host(), options.port(), options.timeout_duration());
        let result = if options.ssl() {
            self.client.ssl_connect(host, port, timeout).await
        } else {
            self.client.connect(host, port, timeout).await
        };

        result.map_err(|e| {
            warn!("Unable to connect to {}: {}", options.addr(), e);
            ConnectionError::ConnectFailure {
                host: host.to_string(),
                port,
                ssl: options.ssl(),
            }
        })
    }

    /// Steps 2 to 5. Leaves closing to the caller on failure.
    async fn configure(
        &self,
        options: &ConnectionOptions,
        connection: &mut C::Connection,
    ) -> Result<(), ConnectionError> {
        self.authenticate(options, connection).await?;
        self.enable_utf8_mode(options, connection).await?;
        self.ignore_passive_address(options, connection)?;
        self.make_connection_passive(options, connection).await
    }

    async fn authenticate(
        &self,
        options: &ConnectionOptions,
        connection: &mut C::Connection,
    ) -> Result<(), ConnectionError> {
        self.client
            .login(connection, options.username(), options.password())
            .await
            .map_err(|e| {
                warn!("Login as {} on {} failed: {}", options.username(), options.addr(), e);
                ConnectionError::AuthFailure {
                    host: options.host().to_string(),
                    port: options.port(),
                    username: options.username().to_string(),
                }
            })
    }

    async fn enable_utf8_mode(
        &self,
        options: &ConnectionOptions,
        connection: &mut C::Connection,
    ) -> Result<(), ConnectionError> {
        if !options.utf8() {
            return Ok(());
        }

        let failure = || ConnectionError::Utf8NegotiationFailure {
            host: options.host().to_string(),
            port: options.port(),
        };

        let response = self.client.raw(connection, ENABLE_UTF8).await.map_err(|e| {
            warn!("{} failed on {}: {}", ENABLE_UTF8, options.addr(), e);
            failure()
        })?;

        let first = response.first().map(String::as_str).unwrap_or("");
        if first.get(..3) != Some("200") {
            warn!("Server {} refused UTF-8 mode: {:?}", options.addr(), first);
            return Err(failure());
        }

        debug!("UTF-8 mode enabled on {}", options.addr());
        Ok(())
    }

    fn ignore_passive_address(
        &self,
        options: &ConnectionOptions,
        connection: &mut C::Connection,
    ) -> Result<(), ConnectionError> {
        let Some(ignore) = options.ignore_passive_address().as_option() else {
            return Ok(());
        };
        if !self.client.supports_option(FtpOption::UsePasvAddress) {
            debug!("Client has no {} option, skipping", FtpOption::UsePasvAddress);
            return Ok(());
        }

        self.client
            .set_option(connection, FtpOption::UsePasvAddress, OptionValue::Bool(!ignore))
            .map_err(|e| {
                warn!("Setting {} failed: {}", FtpOption::UsePasvAddress, e);
                ConnectionError::OptionSetFailure {
                    option: FtpOption::UsePasvAddress.name().to_string(),
                }
            })
    }

    async fn make_connection_passive(
        &self,
        options: &ConnectionOptions,
        connection: &mut C::Connection,
    ) -> Result<(), ConnectionError> {
        self.client
            .pasv(connection, options.passive())
            .await
            .map_err(|e| {
                warn!("Setting passive={} on {} failed: {}", options.passive(), options.addr(), e);
                ConnectionError::PassiveModeFailure {
                    host: options.host().to_string(),
                    port: options.port(),
                }
            })
    }

    /// Closes a half-configured connection. Errors are dropped so they
    /// cannot hide the failure that caused the close.
    async fn close_quietly(&self, connection: C::Connection) {
        if let Err(e) = self.client.close(connection).await {
            debug!("Ignoring error while closing failed connection: {}", e);
        }
    }
}

#[async_trait]
impl<C: Client> ConnectionProvider for FtpConnectionProvider<C> {
    type Connection = C::Connection;

    async fn create_connection(
        &self,
        options: &ConnectionOptions,
    ) -> Result<C::Connection, ConnectionError> {
        let mut connection = self.open_transport(options).await?;

        if let Err(e) = self.configure(options, &mut connection).await {
            self.close_quietly(connection).await;
            return Err(e);
        }

        info!(
            "Connection to {} ready (ssl: {}, utf8: {}, passive: {})",
            options.addr(),
            options.ssl(),
            options.utf8(),
            options.passive()
        );
        Ok(connection)
    }
}
