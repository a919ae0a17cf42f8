//! Listing probe
//!
//! Requests a raw listing of `./` and ignores its content.
//!
//! A failed listing is also reported as connected. Callers relying on this
//! probe therefore cannot detect a dead connection through it; use
//! `NoopCommandConnectivityChecker` when that matters.

use async_trait::async_trait;
use log::warn;

use crate::checker::ConnectivityChecker;
use crate::client::Client;

pub struct RawListConnectivityChecker<C: Client> {
    client: C,
}

impl<C: Client> RawListConnectivityChecker<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }
}

#[async_trait]
impl<C: Client> ConnectivityChecker for RawListConnectivityChecker<C> {
    type Connection = C::Connection;

    async fn is_connected(&self, connection: &mut C::Connection) -> bool {
        if let Err(e) = self.client.rawlist(connection, "./", false).await {
            warn!("Listing probe failed, still reporting connected: {}", e);
        }
        true
    }
}
