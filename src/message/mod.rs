//! Minimal CoAP message model consumed by the observe core.
//!
//! Only the parts the observe relation needs are modelled: message types,
//! tokens, the observe option and the transmission flags the transport sets
//! on responses. Wire encoding lives elsewhere.

mod options;
mod request;
mod response;
pub use options::*;
pub use request::*;
pub use response::*;

#[cfg(test)]
mod message_test;

use std::fmt;
use std::net::SocketAddr;

/// CoAP message type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    /// CON, requires an acknowledgement
    Confirmable,
    /// NON
    NonConfirmable,
    /// ACK
    Acknowledgement,
    /// RST
    Reset,
}

impl fmt::Display for MessageType {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let name = match self {
            MessageType::Confirmable => "CON",
            MessageType::NonConfirmable => "NON",
            MessageType::Acknowledgement => "ACK",
            MessageType::Reset => "RST",
        };
        f.write_str(name)
    }
}

/// Client chosen opaque identifier, 0 to 8 bytes
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Token(Vec<u8>);

impl Token {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Token(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Token {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        for b in &self.0 {
            write!(f, "{:02X}", b)?;
        }
        Ok(())
    }
}

/// Identity of an observe relation: request token scoped by the peer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyToken {
    token: Token,
    peer: SocketAddr,
}

impl KeyToken {
    pub fn new(
        token: Token,
        peer: SocketAddr,
    ) -> Self {
        Self { token, peer }
    }

    pub fn token(&self) -> &Token {
        &self.token
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }
}

impl fmt::Display for KeyToken {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}@{}", self.token, self.peer)
    }
}

/// Network context a message was received on or is sent to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointContext {
    peer_address: SocketAddr,
    virtual_host: Option<String>,
}

impl EndpointContext {
    pub fn new(peer_address: SocketAddr) -> Self {
        Self {
            peer_address,
            virtual_host: None,
        }
    }

    pub fn with_virtual_host(
        mut self,
        host: impl Into<String>,
    ) -> Self {
        self.virtual_host = Some(host.into());
        self
    }

    pub fn peer_address(&self) -> SocketAddr {
        self.peer_address
    }

    pub fn virtual_host(&self) -> Option<&str> {
        self.virtual_host.as_deref()
    }
}
