//! Application protocol selection.
//!
//! The protocol for a connection is fixed once, from the ALPN outcome of the
//! TLS handshake or from `cleartext_protocol` when TLS is off.

use std::fmt;

use thiserror::Error;

pub const ALPN_H2: &[u8] = b"h2";
pub const ALPN_HTTP1: &[u8] = b"http/1.1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Protocol {
    #[default]
    Http1,
    Http2,
}

/// The peer negotiated something this server cannot speak.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unsupported application protocol: {0}")]
pub struct ProtocolError(pub String);

impl Protocol {
    /// Map the negotiated ALPN identifier. No ALPN means HTTP/1.1.
    pub fn from_alpn(alpn: Option<&[u8]>) -> Result<Self, ProtocolError> {
        match alpn {
            None => Ok(Protocol::Http1),
            Some(ALPN_HTTP1) => Ok(Protocol::Http1),
            Some(ALPN_H2) => Ok(Protocol::Http2),
            Some(other) => Err(ProtocolError(String::from_utf8_lossy(other).into_owned())),
        }
    }

    /// Map a configured protocol name (`"http/1.1"` or `"h2"`).
    pub fn from_name(name: &str) -> Result<Self, ProtocolError> {
        Self::from_alpn(Some(name.as_bytes()))
    }

    pub fn alpn_id(&self) -> &'static [u8] {
        match self {
            Protocol::Http1 => ALPN_HTTP1,
            Protocol::Http2 => ALPN_H2,
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Http1 => f.write_str("http/1.1"),
            Protocol::Http2 => f.write_str("h2"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_alpn() {
        assert_eq!(Protocol::from_alpn(None), Ok(Protocol::Http1));
        assert_eq!(Protocol::from_alpn(Some(b"http/1.1")), Ok(Protocol::Http1));
        assert_eq!(Protocol::from_alpn(Some(b"h2")), Ok(Protocol::Http2));
        assert_eq!(
            Protocol::from_alpn(Some(b"spdy/3")),
            Err(ProtocolError("spdy/3".to_string()))
        );
    }

    #[test]
    fn names_round_trip() {
        for protocol in [Protocol::Http1, Protocol::Http2] {
            assert_eq!(Protocol::from_name(&protocol.to_string()), Ok(protocol));
        }
        assert!(Protocol::from_name("h3").is_err());
    }
}
