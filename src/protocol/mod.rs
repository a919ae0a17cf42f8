//! FTP Protocol implementation
//!
//! Client-side command serialization, reply codes and reply parsing.

pub mod commands;
pub mod parser;
pub mod responses;

pub use commands::Command;
pub use parser::{parse_reply_code, is_continuation_line};
pub use responses::Reply;
