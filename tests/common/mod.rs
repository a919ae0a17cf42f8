//! Scripted FTP server for integration tests.
//!
//! Accepts any number of clients on 127.0.0.1, records every command it
//! receives and answers from a fixed script. Supports PASV and PORT data
//! connections for LIST.

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::{TcpListener, TcpStream};

pub const USERNAME: &str = "alice";
pub const PASSWORD: &str = "alice123";

#[derive(Clone)]
pub struct Behavior {
    pub utf8_reply: &'static str,
    /// Address announced in 227 replies. `None` announces the real one.
    pub announced_ip: Option<Ipv4Addr>,
    /// Close the control connection instead of answering NOOP.
    pub drop_on_noop: bool,
    pub listing: Vec<&'static str>,
    /// Hold the LIST data connection open this long before sending the listing.
    pub listing_delay: Option<Duration>,
}

impl Default for Behavior {
    fn default() -> Self {
        Self {
            utf8_reply: "200 Always in UTF8 mode.",
            announced_ip: None,
            drop_on_noop: false,
            listing: vec![
                "drwxr-xr-x 2 ftp ftp 4096 Jan 01 00:00 pub",
                "-rw-r--r-- 1 ftp ftp 1024 Jan 01 00:00 readme.txt",
            ],
            listing_delay: None,
        }
    }
}

pub struct ScriptedServer {
    addr: SocketAddr,
    commands: Arc<Mutex<Vec<String>>>,
}

impl ScriptedServer {
    pub async fn start(behavior: Behavior) -> Self {
        init_logging();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let commands = Arc::new(Mutex::new(Vec::new()));

        let log = Arc::clone(&commands);
        tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    break;
                };
                let log = Arc::clone(&log);
                let behavior = behavior.clone();
                tokio::spawn(async move {
                    let _ = handle_client(stream, log, behavior).await;
                });
            }
        });

        Self { addr, commands }
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().unwrap().clone()
    }
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

enum DataChannel {
    None,
    Passive(TcpListener),
    Active(SocketAddr),
}

async fn reply(writer: &mut OwnedWriteHalf, text: &str) -> std::io::Result<()> {
    writer.write_all(format!("{}\r\n", text).as_bytes()).await?;
    writer.flush().await
}

async fn handle_client(
    stream: TcpStream,
    log: Arc<Mutex<Vec<String>>>,
    behavior: Behavior,
) -> std::io::Result<()> {
    let (read_half, mut writer) = stream.into_split();
    let mut reader = BufReader::new(read_half);
    let mut line = String::new();
    let mut data = DataChannel::None;

    reply(&mut writer, "220 Welcome to RAX FTP Server").await?;

    loop {
        line.clear();
        if reader.read_line(&mut line).await? == 0 {
            return Ok(());
        }
        let command = line.trim_end_matches(['\r', '\n']).to_string();
        log.lock().unwrap().push(command.clone());

        let mut parts = command.splitn(2, ' ');
        let verb = parts.next().unwrap_or("").to_ascii_uppercase();
        let arg = parts.next().unwrap_or("").to_string();

        match verb.as_str() {
            "USER" => reply(&mut writer, "331 Password required").await?,
            "PASS" if arg == PASSWORD => reply(&mut writer, "230 Login successful").await?,
            "PASS" => reply(&mut writer, "530 Invalid password").await?,
            "AUTH" => reply(&mut writer, "502 AUTH not supported").await?,
            "OPTS" => reply(&mut writer, behavior.utf8_reply).await?,
            "NOOP" if behavior.drop_on_noop => return Ok(()),
            "NOOP" => reply(&mut writer, "200 NOOP ok").await?,
            "FEAT" => {
                reply(&mut writer, "211-Features:").await?;
                reply(&mut writer, " UTF8").await?;
                reply(&mut writer, " PASV").await?;
                reply(&mut writer, "211 End").await?;
            }
            "PASV" => {
                let listener = TcpListener::bind("127.0.0.1:0").await?;
                let port = listener.local_addr()?.port();
                let ip = behavior.announced_ip.unwrap_or(Ipv4Addr::LOCALHOST);
                let [a, b, c, d] = ip.octets();
                data = DataChannel::Passive(listener);
                let text = format!(
                    "227 Entering Passive Mode ({},{},{},{},{},{}).",
                    a,
                    b,
                    c,
                    d,
                    port >> 8,
                    port & 0xff
                );
                reply(&mut writer, &text).await?;
            }
            "PORT" => {
                let n: Vec<u16> = arg.split(',').filter_map(|p| p.parse().ok()).collect();
                if n.len() == 6 {
                    let ip = Ipv4Addr::new(n[0] as u8, n[1] as u8, n[2] as u8, n[3] as u8);
                    data = DataChannel::Active(SocketAddr::new(ip.into(), (n[4] << 8) | n[5]));
                    reply(&mut writer, "200 PORT command successful").await?;
                } else {
                    reply(&mut writer, "501 Bad PORT argument").await?;
                }
            }
            "LIST" => {
                let mut stream = match std::mem::replace(&mut data, DataChannel::None) {
                    DataChannel::Passive(listener) => {
                        reply(&mut writer, "150 Opening data connection").await?;
                        listener.accept().await?.0
                    }
                    DataChannel::Active(addr) => {
                        reply(&mut writer, "150 Opening data connection").await?;
                        TcpStream::connect(addr).await?
                    }
                    DataChannel::None => {
                        reply(&mut writer, "425 Use PORT or PASV first").await?;
                        continue;
                    }
                };
                if let Some(delay) = behavior.listing_delay {
                    tokio::time::sleep(delay).await;
                }
                for entry in &behavior.listing {
                    stream.write_all(format!("{}\r\n", entry).as_bytes()).await?;
                }
                stream.shutdown().await?;
                drop(stream);
                reply(&mut writer, "226 Transfer complete").await?;
            }
            "CWD" if arg == "missing" => reply(&mut writer, "550 Directory not found").await?,
            "CWD" => reply(&mut writer, "250 Directory changed").await?,
            "MKD" => reply(&mut writer, &format!("257 \"/{}\" created", arg)).await?,
            "RMD" | "DELE" | "RNTO" => reply(&mut writer, "250 Requested file action okay").await?,
            "RNFR" => reply(&mut writer, "350 Ready for destination name").await?,
            "SIZE" => reply(&mut writer, "213 1024").await?,
            "MDTM" => reply(&mut writer, "213 20240102030405").await?,
            "SITE" => reply(&mut writer, "200 SITE CHMOD command ok").await?,
            "QUIT" => {
                reply(&mut writer, "221 Goodbye").await?;
                return Ok(());
            }
            _ => reply(&mut writer, "500 Unknown command").await?,
        }
    }
}
