//! NOOP probe
//!
//! Sends `NOOP` and expects the reply to reduce to code 200.

use async_trait::async_trait;
use log::debug;

use crate::checker::ConnectivityChecker;
use crate::client::Client;
use crate::protocol::responses::OK;

pub struct NoopCommandConnectivityChecker<C: Client> {
    client: C,
}

impl<C: Client> NoopCommandConnectivityChecker<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }
}

/// Concatenates the reply lines, drops every non-digit and parses the rest.
///
/// No digits, or more than fit in a `u64`, reduce to 0.
fn reply_digits(lines: &[String]) -> u64 {
    let digits: String = lines
        .concat()
        .chars()
        .filter(char::is_ascii_digit)
        .collect();
    digits.parse().unwrap_or(0)
}

#[async_trait]
impl<C: Client> ConnectivityChecker for NoopCommandConnectivityChecker<C> {
    type Connection = C::Connection;

    async fn is_connected(&self, connection: &mut C::Connection) -> bool {
        match self.client.raw(connection, "NOOP").await {
            Ok(lines) => reply_digits(&lines) == u64::from(OK),
            Err(e) => {
                debug!("NOOP probe failed: {}", e);
                false
            }
        }
    }
}
