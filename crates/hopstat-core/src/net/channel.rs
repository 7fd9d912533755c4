use crate::config::ChannelConfig;
use crate::error::{Error, Result};
use crate::net::ipv4::{Ipv4, MIN_PACKET_SIZE_ICMP};
use crate::net::socket::Socket;
use crate::net::{platform, Network};
use crate::probe::{Probe, Response};
use std::time::Duration;
use tracing::instrument;

/// The maximum size of the IP packet we allow.
pub const MAX_PACKET_SIZE: usize = 1024;

/// The minimum size of the IP packet we allow.
pub const MIN_PACKET_SIZE: usize = MIN_PACKET_SIZE_ICMP;

/// A channel for sending and receiving `Probe` packets.
///
/// Both sockets are closed when the channel is dropped.
pub struct Channel<S: Socket> {
    read_timeout: Duration,
    send_socket: S,
    recv_socket: S,
    ipv4: Ipv4,
}

impl<S: Socket> Channel<S> {
    /// Create an `IcmpChannel`.
    ///
    /// This operation requires the `CAP_NET_RAW` capability on Linux.
    #[instrument(skip_all, level = "trace")]
    pub fn connect(config: &ChannelConfig) -> Result<Self> {
        tracing::debug!(?config);
        let packet_size = usize::from(config.packet_size.0);
        if !(MIN_PACKET_SIZE..=MAX_PACKET_SIZE).contains(&packet_size) {
            return Err(Error::InvalidPacketSize(packet_size));
        }
        let byte_order = platform::Ipv4ByteOrder::for_address(config.source_addr)?;
        let send_socket = S::new_icmp_send_socket_ipv4()?;
        let recv_socket = S::new_recv_socket_ipv4()?;
        Ok(Self {
            read_timeout: config.read_timeout,
            send_socket,
            recv_socket,
            ipv4: Ipv4 {
                src_addr: config.source_addr,
                dest_addr: config.target_addr,
                byte_order,
                packet_size: config.packet_size,
            },
        })
    }
}

impl<S: Socket> Network for Channel<S> {
    #[instrument(skip(self), level = "trace")]
    fn send_probe(&mut self, probe: Probe) -> Result<()> {
        tracing::debug!(?probe);
        self.ipv4.dispatch_icmp_probe(&mut self.send_socket, probe)
    }

    #[instrument(skip_all, level = "trace")]
    fn recv_probe(&mut self) -> Result<Option<Response>> {
        let resp = if self.recv_socket.is_readable(self.read_timeout)? {
            self.ipv4.recv_icmp_probe(&mut self.recv_socket)?
        } else {
            None
        };
        if let Some(resp) = &resp {
            tracing::debug!(?resp);
        }
        Ok(resp)
    }
}
