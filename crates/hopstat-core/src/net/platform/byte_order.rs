use crate::error::Result;
use crate::net::platform::{Platform, PlatformImpl};
use std::net::Ipv4Addr;

/// The byte order to encode the `total_length`, `flags` and `fragment_offset` fields of the IPv4
/// header.
///
/// Every other header field is sent in network byte order.  Linux accepts
/// either order for these fields, `FreeBSD` 11 requires network order while
/// older releases and macOS require host order.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Ipv4ByteOrder {
    #[cfg(all(unix, not(target_os = "linux")))]
    Host,
    Network,
}

impl Ipv4ByteOrder {
    /// Discover the required byte ordering for the IPv4 header fields `total_length`, `flags` and
    /// `fragment_offset`.
    ///
    /// Where this cannot be known up front an `IPv4` packet is sent to
    /// localhost with the `total_length` set first in network order and then
    /// swapped.  The OS rejects the send with `InvalidInput` when the length
    /// disagrees with the buffer, which is the case for the wrong order.
    ///
    /// For a packet of length 4660 (`0x1234`) on a little-endian host:
    ///
    /// Try        Host (LE)    Wire (BE)   Order (if succeeds)
    /// normal     34 12        12 34       `Ipv4ByteOrder::Network`
    /// swapped    12 34        34 12       `Ipv4ByteOrder::Host`
    pub fn for_address(addr: Ipv4Addr) -> Result<Self> {
        PlatformImpl::byte_order_for_address(addr)
    }

    /// Adjust an IPv4 `total_length` or `flags_and_fragment_offset` header value.
    #[must_use]
    pub const fn adjust_length(self, value: u16) -> u16 {
        match self {
            #[cfg(all(unix, not(target_os = "linux")))]
            Self::Host => value.swap_bytes(),
            Self::Network => value,
        }
    }
}
