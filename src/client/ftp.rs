//! Module `ftp`
//!
//! `FtpClient`, the network implementation of the `Client` trait.

use async_trait::async_trait;
use log::{debug, info};
use rustls::ClientConfig;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncReadExt;

use crate::client::connection::{FtpConnection, timed};
use crate::client::data_channel::open_data_stream;
use crate::client::tls::{TlsContext, native_roots_config};
use crate::client::{Client, FtpOption, OptionValue};
use crate::error::ClientError;
use crate::protocol::Command;
use crate::protocol::parser::{parse_mdtm, parse_quoted_path, parse_size};
use crate::protocol::responses::{
    AUTH_OK, CLOSING, EXTENDED_PASSIVE_MODE, FILE_ACTION_OK, FILE_STATUS, LOGIN_SUCCESS, OK,
    PASSIVE_MODE, PASSWORD_REQUIRED, PATH_CREATED, PENDING_FURTHER_INFO, SUPERFLUOUS,
    TRANSFER_COMPLETE,
};

/// FTP client over tokio sockets.
///
/// Stateless apart from the TLS configuration, so one instance can serve any
/// number of connections and be cloned freely.
#[derive(Clone, Default)]
pub struct FtpClient {
    tls_config: Option<Arc<ClientConfig>>,
}

impl FtpClient {
    /// Client using the platform's root certificates for FTPS.
    pub fn new() -> Self {
        Self::default()
    }

    /// Client using a caller-supplied rustls configuration for FTPS.
    pub fn with_tls_config(config: Arc<ClientConfig>) -> Self {
        Self {
            tls_config: Some(config),
        }
    }

    fn tls_config(&self) -> Result<Arc<ClientConfig>, ClientError> {
        match &self.tls_config {
            Some(config) => Ok(Arc::clone(config)),
            None => native_roots_config(),
        }
    }
}

#[async_trait]
impl Client for FtpClient {
    type Connection = FtpConnection;

    async fn connect(
        &self,
        host: &str,
        port: u16,
        timeout: Duration,
    ) -> Result<FtpConnection, ClientError> {
        FtpConnection::open(host, port, timeout).await
    }

    async fn ssl_connect(
        &self,
        host: &str,
        port: u16,
        timeout: Duration,
    ) -> Result<FtpConnection, ClientError> {
        let tls = TlsContext::new(self.tls_config()?, host)?;
        let mut connection = FtpConnection::open(host, port, timeout).await?;
        connection
            .expect(Command::AUTH("TLS".to_string()), &[AUTH_OK])
            .await?;
        connection.into_secure(tls).await
    }

    async fn login(
        &self,
        connection: &mut FtpConnection,
        username: &str,
        password: &str,
    ) -> Result<(), ClientError> {
        let reply = connection
            .expect(
                Command::USER(username.to_string()),
                &[LOGIN_SUCCESS, PASSWORD_REQUIRED],
            )
            .await?;
        if reply.is(PASSWORD_REQUIRED) {
            connection
                .expect(
                    Command::PASS(password.to_string()),
                    &[LOGIN_SUCCESS, SUPERFLUOUS],
                )
                .await?;
        }

        if connection.is_secure() {
            connection.expect(Command::PBSZ(0), &[OK]).await?;
            connection.expect(Command::PROT('P'), &[OK]).await?;
            connection.set_protected(true);
        }

        info!("Logged in to {} as {}", connection.host(), username);
        Ok(())
    }

    async fn raw(
        &self,
        connection: &mut FtpConnection,
        command: &str,
    ) -> Result<Vec<String>, ClientError> {
        let reply = connection.execute(Command::Raw(command.to_string())).await?;
        Ok(reply.into_lines())
    }

    async fn rawlist(
        &self,
        connection: &mut FtpConnection,
        directory: &str,
        recursive: bool,
    ) -> Result<Vec<String>, ClientError> {
        let command = Command::LIST {
            path: directory.to_string(),
            recursive,
        };
        let mut data = open_data_stream(connection, command).await?;

        let mut listing = Vec::new();
        let read = timed(
            connection.timeout(),
            "Failed to read directory listing",
            data.read_to_end(&mut listing),
        )
        .await;
        drop(data);
        // The final 226 is still pending on the control channel.
        connection.check(read)?;

        connection
            .expect_reply("LIST", &[TRANSFER_COMPLETE, FILE_ACTION_OK])
            .await?;

        let lines: Vec<String> = String::from_utf8_lossy(&listing)
            .lines()
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        debug!("Listed {} entries in {}", lines.len(), directory);
        Ok(lines)
    }

    fn supports_option(&self, option: FtpOption) -> bool {
        matches!(option, FtpOption::UsePasvAddress | FtpOption::TimeoutSec)
    }

    fn set_option(
        &self,
        connection: &mut FtpConnection,
        option: FtpOption,
        value: OptionValue,
    ) -> Result<(), ClientError> {
        match (option, value) {
            (FtpOption::UsePasvAddress, OptionValue::Bool(enabled)) => {
                connection.set_use_pasv_address(enabled)
            }
            (FtpOption::TimeoutSec, OptionValue::Seconds(secs)) if secs > 0 => {
                connection.set_timeout(Duration::from_secs(secs))
            }
            (option, value) => {
                return Err(ClientError::new(format!(
                    "Invalid value {:?} for option {}",
                    value, option
                )));
            }
        }
        debug!("Set option {} to {:?}", option, value);
        Ok(())
    }

    async fn pasv(&self, connection: &mut FtpConnection, passive: bool) -> Result<(), ClientError> {
        if passive {
            if connection.peer_addr().is_ipv4() {
                connection.expect(Command::PASV, &[PASSIVE_MODE]).await?;
            } else {
                connection
                    .expect(Command::EPSV, &[EXTENDED_PASSIVE_MODE])
                    .await?;
            }
        }
        connection.set_passive(passive);
        debug!(
            "Data connections to {} will be {}",
            connection.host(),
            if passive { "passive" } else { "active" }
        );
        Ok(())
    }

    async fn close(&self, mut connection: FtpConnection) -> Result<(), ClientError> {
        let result = connection.expect(Command::QUIT, &[CLOSING]).await;
        connection.shutdown().await;
        info!("Closed connection to {}", connection.host());
        result.map(|_| ())
    }

    async fn chdir(&self, connection: &mut FtpConnection, directory: &str) -> Result<(), ClientError> {
        connection
            .expect(Command::CWD(directory.to_string()), &[FILE_ACTION_OK])
            .await?;
        Ok(())
    }

    async fn mkdir(&self, connection: &mut FtpConnection, directory: &str) -> Result<String, ClientError> {
        let reply = connection
            .expect(Command::MKD(directory.to_string()), &[PATH_CREATED])
            .await?;
        Ok(parse_quoted_path(reply.last_line()).unwrap_or_else(|| directory.to_string()))
    }

    async fn rmdir(&self, connection: &mut FtpConnection, directory: &str) -> Result<(), ClientError> {
        connection
            .expect(Command::RMD(directory.to_string()), &[FILE_ACTION_OK])
            .await?;
        Ok(())
    }

    async fn delete(&self, connection: &mut FtpConnection, path: &str) -> Result<(), ClientError> {
        connection
            .expect(Command::DELE(path.to_string()), &[FILE_ACTION_OK])
            .await?;
        Ok(())
    }

    async fn rename(&self, connection: &mut FtpConnection, old: &str, new: &str) -> Result<(), ClientError> {
        connection
            .expect(Command::RNFR(old.to_string()), &[PENDING_FURTHER_INFO])
            .await?;
        connection
            .expect(Command::RNTO(new.to_string()), &[FILE_ACTION_OK])
            .await?;
        Ok(())
    }

    async fn size(&self, connection: &mut FtpConnection, remote: &str) -> Result<u64, ClientError> {
        let reply = connection
            .expect(Command::SIZE(remote.to_string()), &[FILE_STATUS])
            .await?;
        match parse_size(reply.last_line()) {
            Some(size) => Ok(size),
            None => Err(ClientError::unexpected_reply(
                "Malformed SIZE reply",
                reply.into_lines(),
            )),
        }
    }

    async fn mdtm(&self, connection: &mut FtpConnection, remote: &str) -> Result<i64, ClientError> {
        let reply = connection
            .expect(Command::MDTM(remote.to_string()), &[FILE_STATUS])
            .await?;
        match parse_mdtm(reply.last_line()) {
            Some(timestamp) => Ok(timestamp),
            None => Err(ClientError::unexpected_reply(
                "Malformed MDTM reply",
                reply.into_lines(),
            )),
        }
    }

    async fn chmod(&self, connection: &mut FtpConnection, mode: u32, filename: &str) -> Result<u32, ClientError> {
        connection
            .expect(Command::SITE(format!("CHMOD {:o} {}", mode, filename)), &[OK])
            .await?;
        Ok(mode)
    }
}
