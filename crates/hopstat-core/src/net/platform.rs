pub mod byte_order;

pub use byte_order::Ipv4ByteOrder;
use std::net::Ipv4Addr;

#[cfg(unix)]
mod unix;

use crate::error::Result;
#[cfg(unix)]
pub use unix::*;

/// Platform specific operations.
///
/// Abstracts the operating system queries needed to pick a source address
/// and to encode the `IPv4` header of outgoing probes.
#[cfg_attr(test, mockall::automock)]
pub trait Platform {
    /// Determine the required byte ordering for IPv4 header fields.
    ///
    /// The `total_length` and `flags_and_fragment_offset` fields of a
    /// header-included `IPv4` packet must be encoded in an order which
    /// varies between operating systems.
    fn byte_order_for_address(addr: Ipv4Addr) -> Result<Ipv4ByteOrder>;

    /// Lookup an `Ipv4Addr` for an interface.
    ///
    /// If the interface has more than one address then an arbitrary address
    /// is selected and returned.
    fn lookup_interface_addr(name: &str) -> Result<Ipv4Addr>;

    /// Discover a local `Ipv4Addr` which can route to the target address.
    ///
    /// No packets are sent.
    fn discover_local_addr(target_addr: Ipv4Addr, port: u16) -> Result<Ipv4Addr>;
}
