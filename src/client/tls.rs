//! TLS support for explicit FTPS
//!
//! Builds the rustls client configuration and performs handshakes for the
//! control connection (after `AUTH TLS`) and protected data connections.

use log::{debug, warn};
use rustls::pki_types::ServerName;
use rustls::{ClientConfig, RootCertStore};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;
use tokio_rustls::client::TlsStream;

use crate::client::connection::timed;
use crate::error::ClientError;

/// Everything needed to start another TLS session towards the same server.
#[derive(Clone)]
#[derive(Debug)]
pub struct TlsContext {
    config: Arc<ClientConfig>,
    server_name: ServerName<'static>,
}

impl TlsContext {
    pub fn new(config: Arc<ClientConfig>, host: &str) -> Result<Self, ClientError> {
        let server_name = ServerName::try_from(host.to_string())
            .map_err(|e| ClientError::new(format!("Invalid TLS server name {}: {}", host, e)))?;
        Ok(Self {
            config,
            server_name,
        })
    }

    /// Performs a client handshake over `stream`.
    ///
    /// The same `ClientConfig` is shared by every session so that data
    /// connections can resume the control connection's TLS session.
    pub async fn handshake(
        &self,
        stream: TcpStream,
        timeout: Duration,
    ) -> Result<TlsStream<TcpStream>, ClientError> {
        let connector = TlsConnector::from(Arc::clone(&self.config));
        timed(
            timeout,
            "TLS handshake failed",
            connector.connect(self.server_name.clone(), stream),
        )
        .await
    }
}

/// Client configuration trusting the platform's native root certificates.
pub fn native_roots_config() -> Result<Arc<ClientConfig>, ClientError> {
    let native = rustls_native_certs::load_native_certs();
    for err in &native.errors {
        warn!("Skipping unreadable native CA certificate: {}", err);
    }

    let mut roots = RootCertStore::empty();
    let (added, ignored) = roots.add_parsable_certificates(native.certs);
    debug!("Loaded {} native CA certificates ({} ignored)", added, ignored);

    let provider = Arc::new(rustls::crypto::ring::default_provider());
    let config = ClientConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .map_err(|e| ClientError::new(format!("TLS configuration rejected: {}", e)))?
        .with_root_certificates(roots)
        .with_no_client_auth();

    Ok(Arc::new(config))
}
