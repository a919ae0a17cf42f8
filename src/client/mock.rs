//! Recording `Client` used by unit tests.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::client::{Client, FtpOption, OptionValue};
use crate::error::ClientError;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    Connect { host: String, port: u16, timeout: Duration },
    SslConnect { host: String, port: u16, timeout: Duration },
    Login { username: String, password: String },
    Raw(String),
    RawList { directory: String, recursive: bool },
    SetOption { option: FtpOption, value: OptionValue },
    Pasv(bool),
    Close,
    Other(&'static str),
}

/// Connection handle handed out by `MockClient`. Deliberately not `Clone`.
#[derive(Debug)]
pub(crate) struct MockConnection {
    pub(crate) id: u32,
}

#[derive(Default)]
struct State {
    calls: Vec<Call>,
    failing: HashSet<&'static str>,
    raw_replies: HashMap<String, Vec<String>>,
    without_options: bool,
    next_id: u32,
}

#[derive(Clone, Default)]
pub(crate) struct MockClient {
    state: Arc<Mutex<State>>,
}

impl MockClient {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Makes every call of `verb` fail.
    pub(crate) fn failing(self, verb: &'static str) -> Self {
        self.state.lock().unwrap().failing.insert(verb);
        self
    }

    pub(crate) fn replying(self, command: &str, lines: &[&str]) -> Self {
        self.state.lock().unwrap().raw_replies.insert(
            command.to_string(),
            lines.iter().map(|line| line.to_string()).collect(),
        );
        self
    }

    pub(crate) fn without_option_support(self) -> Self {
        self.state.lock().unwrap().without_options = true;
        self
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub(crate) fn count(&self, wanted: &Call) -> usize {
        self.calls().iter().filter(|call| *call == wanted).count()
    }

    fn record(&self, verb: &'static str, call: Call) -> Result<(), ClientError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        if state.failing.contains(verb) {
            Err(ClientError::new(format!("{} failed", verb)))
        } else {
            Ok(())
        }
    }

    fn open(&self, verb: &'static str, call: Call) -> Result<MockConnection, ClientError> {
        self.record(verb, call)?;
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        Ok(MockConnection { id: state.next_id })
    }
}

#[async_trait]
impl Client for MockClient {
    type Connection = MockConnection;

    async fn connect(&self, host: &str, port: u16, timeout: Duration) -> Result<MockConnection, ClientError> {
        let call = Call::Connect { host: host.to_string(), port, timeout };
        self.open("connect", call)
    }

    async fn ssl_connect(&self, host: &str, port: u16, timeout: Duration) -> Result<MockConnection, ClientError> {
        let call = Call::SslConnect { host: host.to_string(), port, timeout };
        self.open("ssl_connect", call)
    }

    async fn login(&self, _: &mut MockConnection, username: &str, password: &str) -> Result<(), ClientError> {
        let call = Call::Login { username: username.to_string(), password: password.to_string() };
        self.record("login", call)
    }

    async fn raw(&self, _: &mut MockConnection, command: &str) -> Result<Vec<String>, ClientError> {
        self.record("raw", Call::Raw(command.to_string()))?;
        let state = self.state.lock().unwrap();
        Ok(state
            .raw_replies
            .get(command)
            .cloned()
            .unwrap_or_else(|| vec!["200 OK".to_string()]))
    }

    async fn rawlist(&self, _: &mut MockConnection, directory: &str, recursive: bool) -> Result<Vec<String>, ClientError> {
        let call = Call::RawList { directory: directory.to_string(), recursive };
        self.record("rawlist", call)?;
        Ok(vec!["drwxr-xr-x 2 ftp ftp 4096 Jan 01 00:00 pub".to_string()])
    }

    fn supports_option(&self, _: FtpOption) -> bool {
        !self.state.lock().unwrap().without_options
    }

    fn set_option(&self, _: &mut MockConnection, option: FtpOption, value: OptionValue) -> Result<(), ClientError> {
        self.record("set_option", Call::SetOption { option, value })
    }

    async fn pasv(&self, _: &mut MockConnection, passive: bool) -> Result<(), ClientError> {
        self.record("pasv", Call::Pasv(passive))
    }

    async fn close(&self, _: MockConnection) -> Result<(), ClientError> {
        self.record("close", Call::Close)
    }

    async fn chdir(&self, _: &mut MockConnection, _: &str) -> Result<(), ClientError> {
        self.record("chdir", Call::Other("chdir"))
    }

    async fn mkdir(&self, _: &mut MockConnection, directory: &str) -> Result<String, ClientError> {
        self.record("mkdir", Call::Other("mkdir"))?;
        Ok(directory.to_string())
    }

    async fn rmdir(&self, _: &mut MockConnection, _: &str) -> Result<(), ClientError> {
        self.record("rmdir", Call::Other("rmdir"))
    }

    async fn delete(&self, _: &mut MockConnection, _: &str) -> Result<(), ClientError> {
        self.record("delete", Call::Other("delete"))
    }

    async fn rename(&self, _: &mut MockConnection, _: &str, _: &str) -> Result<(), ClientError> {
        self.record("rename", Call::Other("rename"))
    }

    async fn size(&self, _: &mut MockConnection, _: &str) -> Result<u64, ClientError> {
        self.record("size", Call::Other("size"))?;
        Ok(0)
    }

    async fn mdtm(&self, _: &mut MockConnection, _: &str) -> Result<i64, ClientError> {
        self.record("mdtm", Call::Other("mdtm"))?;
        Ok(0)
    }

    async fn chmod(&self, _: &mut MockConnection, mode: u32, _: &str) -> Result<u32, ClientError> {
        self.record("chmod", Call::Other("chmod"))?;
        Ok(mode)
    }
}
