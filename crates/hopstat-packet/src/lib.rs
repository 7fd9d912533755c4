//! Wire format parsing and building for the packets used by `hopstat`.
//!
//! Only the packets needed to run a TTL limited `ICMPv4` echo trace are
//! supported:
//! - `IPv4`
//! - `ICMPv4` echo request and echo reply
//! - `ICMPv4` time exceeded
//!
//! # Endianness
//!
//! Packet bytes are always held in network byte order (big-endian).  Every
//! getter returns host byte order and every setter accepts host byte order.
//!
//! # Example
//!
//! Build an `ICMPv4` echo request:
//!
//! ```rust
//! # fn main() -> anyhow::Result<()> {
//! use hopstat_packet::checksum::icmp_ipv4_checksum;
//! use hopstat_packet::icmpv4::echo::EchoPacket;
//! use hopstat_packet::icmpv4::{IcmpCode, IcmpType};
//!
//! let mut buf = [0; EchoPacket::minimum_packet_size()];
//! let mut echo = EchoPacket::new(&mut buf)?;
//! echo.set_icmp_type(IcmpType::EchoRequest);
//! echo.set_icmp_code(IcmpCode(0));
//! echo.set_identifier(1234);
//! echo.set_sequence(10);
//! echo.set_checksum(icmp_ipv4_checksum(echo.packet()));
//! assert_eq!(echo.packet(), &hex_literal::hex!("08 00 f3 23 04 d2 00 0a"));
//! # Ok(())
//! # }
//! ```
#![warn(clippy::all, clippy::pedantic, clippy::nursery, rust_2018_idioms)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![forbid(unsafe_code)]

mod buffer;

/// Packet errors.
pub mod error;

/// Internet checksum calculation.
pub mod checksum;

/// `IPv4` packets.
pub mod ipv4;

/// `ICMPv4` packets.
pub mod icmpv4;

/// The protocol carried in the payload of an `IPv4` packet.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum IpProtocol {
    Icmp,
    Other(u8),
}

impl IpProtocol {
    #[must_use]
    pub const fn id(self) -> u8 {
        match self {
            Self::Icmp => 1,
            Self::Other(id) => id,
        }
    }
}

impl From<u8> for IpProtocol {
    fn from(id: u8) -> Self {
        match id {
            1 => Self::Icmp,
            p => Self::Other(p),
        }
    }
}

/// Render a payload as space separated hex octets.
#[must_use]
pub fn fmt_payload(bytes: &[u8]) -> String {
    use itertools::Itertools as _;
    format!("{:02x}", bytes.iter().format(" "))
}
