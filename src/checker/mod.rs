//! Connectivity checks
//!
//! Liveness probes run against an already-open connection. A check never
//! fails; every client error is folded into the boolean result, so callers
//! can probe opportunistically before deciding to reconnect.

pub mod noop;
pub mod raw_list;

use async_trait::async_trait;

pub use noop::NoopCommandConnectivityChecker;
pub use raw_list::RawListConnectivityChecker;

#[async_trait]
pub trait ConnectivityChecker: Send + Sync {
    type Connection: Send;

    async fn is_connected(&self, connection: &mut Self::Connection) -> bool;
}
