//! Fire-and-forget target dispatch.
//!
//! One datagram per target, no retry, no acknowledgment. The socket is
//! bound once at session start; each send encodes the mm pair with the
//! configured wire format and pushes it to the robot controller.

use anyhow::{Context, Result};
use std::net::{SocketAddr, UdpSocket};

use crate::types::MmPoint;
use crate::wire::WireFormat;

/// Seam between the session and the network. The session only knows it
/// can hand a mm pair to *something*; tests substitute a recorder.
pub trait TargetSink {
    fn send(&mut self, target: MmPoint) -> Result<()>;
}

pub struct UdpDispatcher {
    socket: UdpSocket,
    remote: SocketAddr,
    format: WireFormat,
}

impl UdpDispatcher {
    pub fn bind(local: SocketAddr, remote: SocketAddr, format: WireFormat) -> Result<Self> {
        let socket = UdpSocket::bind(local)
            .with_context(|| format!("failed to bind UDP socket on {}", local))?;
        Ok(Self {
            socket,
            remote,
            format,
        })
    }

    pub fn remote(&self) -> SocketAddr {
        self.remote
    }
}

impl TargetSink for UdpDispatcher {
    fn send(&mut self, target: MmPoint) -> Result<()> {
        let payload = self.format.encode(target);
        self.socket
            .send_to(&payload, self.remote)
            .with_context(|| format!("failed to send target datagram to {}", self.remote))?;
        Ok(())
    }
}
