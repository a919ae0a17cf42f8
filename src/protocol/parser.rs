//! FTP reply parsing
//!
//! Extracts reply codes and the structured payloads some replies carry
//! (passive addresses, sizes, timestamps, created paths).

use chrono::NaiveDateTime;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};

/// Returns the three-digit reply code at the start of `line`, if any.
pub fn parse_reply_code(line: &str) -> Option<u16> {
    let code = line.get(..3)?;
    if !code.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    code.parse().ok()
}

/// `NNN-text` opens a multi-line reply.
pub fn is_continuation_line(line: &str) -> bool {
    parse_reply_code(line).is_some() && line.as_bytes().get(3) == Some(&b'-')
}

/// Whether `line` terminates a reply that was opened with `code`.
pub fn is_final_line(code: u16, line: &str) -> bool {
    parse_reply_code(line) == Some(code) && line.as_bytes().get(3) != Some(&b'-')
}

/// Parses the `h1,h2,h3,h4,p1,p2` address out of a 227 reply.
///
/// Servers differ on whether the tuple is parenthesized, so the first run of
/// digits and commas after the code is taken.
pub fn parse_passive_reply(line: &str) -> Option<SocketAddrV4> {
    let text = line.get(4..)?;
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let tuple = text[start..]
        .split(|c: char| !(c.is_ascii_digit() || c == ','))
        .next()?;
    let numbers = tuple
        .split(',')
        .map(|part| part.parse::<u8>().ok())
        .collect::<Option<Vec<u8>>>()?;
    if numbers.len() != 6 {
        return None;
    }

    let ip = Ipv4Addr::new(numbers[0], numbers[1], numbers[2], numbers[3]);
    let port = (u16::from(numbers[4]) << 8) | u16::from(numbers[5]);
    Some(SocketAddrV4::new(ip, port))
}

/// Parses the port out of a 229 reply, e.g. `(|||6446|)`.
pub fn parse_extended_passive_reply(line: &str) -> Option<u16> {
    let open = line.find('(')?;
    let inner = &line[open + 1..];
    let inner = &inner[..inner.find(')')?];
    let delimiter = inner.chars().next()?;
    let parts: Vec<&str> = inner.split(delimiter).collect();
    if parts.len() != 5 {
        return None;
    }
    parts[3].parse().ok()
}

/// Argument of a PORT command for `addr`.
pub fn format_port_argument(addr: SocketAddrV4) -> String {
    let [a, b, c, d] = addr.ip().octets();
    let port = addr.port();
    format!("{},{},{},{},{},{}", a, b, c, d, port >> 8, port & 0xff)
}

/// Argument of an EPRT command for `addr`.
pub fn format_eprt_argument(addr: &SocketAddr) -> String {
    let family = match addr {
        SocketAddr::V4(_) => 1,
        SocketAddr::V6(_) => 2,
    };
    format!("|{}|{}|{}|", family, addr.ip(), addr.port())
}

/// Path quoted in a 257 reply. Embedded quotes are doubled (`""`).
pub fn parse_quoted_path(line: &str) -> Option<String> {
    let start = line.find('"')?;
    let mut chars = line[start + 1..].chars().peekable();
    let mut path = String::new();

    while let Some(c) = chars.next() {
        if c == '"' {
            if chars.peek() == Some(&'"') {
                chars.next();
                path.push('"');
            } else {
                return Some(path);
            }
        } else {
            path.push(c);
        }
    }
    None
}

/// Byte count in a 213 reply to SIZE.
pub fn parse_size(line: &str) -> Option<u64> {
    line.get(4..)?.trim().parse().ok()
}

/// Unix timestamp from a 213 reply to MDTM (`YYYYMMDDhhmmss[.sss]`, UTC).
pub fn parse_mdtm(line: &str) -> Option<i64> {
    let value = line.get(4..)?.trim();
    let stamp = value.get(..14)?;
    NaiveDateTime::parse_from_str(stamp, "%Y%m%d%H%M%S")
        .ok()
        .map(|dt| dt.and_utc().timestamp())
}
