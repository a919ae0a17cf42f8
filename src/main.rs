//! RAX FTP Connect - Entry Point
//!
//! Opens a connection to the configured FTP server, runs the configured
//! connectivity check and exits non-zero when the server is unreachable.

use log::{error, info, warn};
use std::process::ExitCode;

use rax_ftp_connect::config::{CheckerKind, ClientSettings};
use rax_ftp_connect::{
    Client, ConnectionProvider, ConnectivityChecker, FtpClient, FtpConnection,
    FtpConnectionProvider, NoopCommandConnectivityChecker, RawListConnectivityChecker,
};

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize the logger (env_logger picks up RUST_LOG environment variable)
    env_logger::init();

    let settings = match ClientSettings::load() {
        Ok(settings) => settings,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return ExitCode::from(2);
        }
    };

    info!("Checking FTP connectivity to {}", settings.connection.addr());

    let client = FtpClient::new();
    let provider = FtpConnectionProvider::with_client(client.clone());

    let mut connection = match provider.create_connection(&settings.connection).await {
        Ok(connection) => connection,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let checker: Box<dyn ConnectivityChecker<Connection = FtpConnection>> = match settings.checker {
        CheckerKind::Noop => Box::new(NoopCommandConnectivityChecker::new(client.clone())),
        CheckerKind::RawList => Box::new(RawListConnectivityChecker::new(client.clone())),
    };

    let connected = checker.is_connected(&mut connection).await;

    if let Err(e) = client.close(connection).await {
        warn!("Error while closing connection: {}", e);
    }

    if connected {
        info!("{} is reachable", settings.connection.addr());
        ExitCode::SUCCESS
    } else {
        error!("{} did not answer the connectivity probe", settings.connection.addr());
        ExitCode::FAILURE
    }
}
