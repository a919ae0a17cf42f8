//! Module `data_channel`
//!
//! Opens the data connection a command such as LIST needs, in passive mode
//! (client connects to the address announced by PASV/EPSV) or active mode
//! (client listens and announces itself with PORT/EPRT).

use log::{debug, info};
use std::net::SocketAddr;
use tokio::net::{TcpListener, TcpStream};

use crate::client::connection::{FtpConnection, timed};
use crate::client::stream::NetStream;
use crate::error::ClientError;
use crate::protocol::Command;
use crate::protocol::parser::{
    format_eprt_argument, format_port_argument, parse_extended_passive_reply, parse_passive_reply,
};
use crate::protocol::responses::{
    DATA_CONNECTION_OPEN, EXTENDED_PASSIVE_MODE, OK, OPENING_DATA_CONNECTION, PASSIVE_MODE,
};

const DATA_READY: [u16; 2] = [DATA_CONNECTION_OPEN, OPENING_DATA_CONNECTION];

/// Opens a data connection and issues `command` over the control channel.
///
/// Returns once the server has acknowledged the command with 125/150 and the
/// data stream is ready to read.
pub(crate) async fn open_data_stream(
    connection: &mut FtpConnection,
    command: Command,
) -> Result<NetStream, ClientError> {
    let stream = if connection.is_passive() {
        let addr = passive_address(connection).await?;
        debug!("Opening passive data connection to {}", addr);
        let stream = timed(
            connection.timeout(),
            &format!("Unable to open data connection to {}", addr),
            TcpStream::connect(addr),
        )
        .await?;
        connection.expect(command, &DATA_READY).await?;
        stream
    } else {
        let listener = TcpListener::bind(SocketAddr::new(connection.local_addr().ip(), 0)).await?;
        let announced = listener.local_addr()?;
        let announce = match announced {
            SocketAddr::V4(v4) => Command::PORT(format_port_argument(v4)),
            SocketAddr::V6(_) => Command::EPRT(format_eprt_argument(&announced)),
        };
        connection.expect(announce, &[OK]).await?;
        connection.expect(command, &DATA_READY).await?;

        let accepted = timed(
            connection.timeout(),
            "Server did not open the active data connection",
            listener.accept(),
        )
        .await;
        let (stream, peer) = connection.check(accepted)?;
        info!("Accepted active data connection from {}", peer);
        stream
    };

    // Past this point the server has acknowledged the command and owes a final reply.
    let wrapped = connection.wrap_data(stream).await;
    connection.check(wrapped)
}

/// Address to connect to for a passive data connection.
///
/// The address announced in a 227 reply is used only when the connection is
/// configured to honour it; otherwise the control peer's IP is kept and only
/// the announced port is taken.
async fn passive_address(connection: &mut FtpConnection) -> Result<SocketAddr, ClientError> {
    let peer = connection.peer_addr();

    match peer {
        SocketAddr::V4(_) => {
            let reply = connection.expect(Command::PASV, &[PASSIVE_MODE]).await?;
            let announced = match parse_passive_reply(reply.last_line()) {
                Some(addr) => addr,
                None => {
                    return Err(ClientError::unexpected_reply(
                        "Malformed PASV reply",
                        reply.into_lines(),
                    ));
                }
            };
            if connection.uses_pasv_address() {
                Ok(SocketAddr::V4(announced))
            } else {
                Ok(SocketAddr::new(peer.ip(), announced.port()))
            }
        }
        SocketAddr::V6(_) => {
            let reply = connection
                .expect(Command::EPSV, &[EXTENDED_PASSIVE_MODE])
                .await?;
            match parse_extended_passive_reply(reply.last_line()) {
                Some(port) => Ok(SocketAddr::new(peer.ip(), port)),
                None => Err(ClientError::unexpected_reply(
                    "Malformed EPSV reply",
                    reply.into_lines(),
                )),
            }
        }
    }
}
