use crate::buffer::Buffer;
use crate::error::Result;
use std::fmt::{Debug, Formatter};

/// The type of an `ICMPv4` packet.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum IcmpType {
    EchoReply,
    DestinationUnreachable,
    EchoRequest,
    TimeExceeded,
    Other(u8),
}

impl IcmpType {
    #[must_use]
    pub const fn id(self) -> u8 {
        match self {
            Self::EchoReply => 0,
            Self::DestinationUnreachable => 3,
            Self::EchoRequest => 8,
            Self::TimeExceeded => 11,
            Self::Other(id) => id,
        }
    }
}

impl From<u8> for IcmpType {
    fn from(val: u8) -> Self {
        match val {
            0 => Self::EchoReply,
            3 => Self::DestinationUnreachable,
            8 => Self::EchoRequest,
            11 => Self::TimeExceeded,
            id => Self::Other(id),
        }
    }
}

/// The `ICMPv4` code.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct IcmpCode(pub u8);

impl From<u8> for IcmpCode {
    fn from(val: u8) -> Self {
        Self(val)
    }
}

/// The code of a `TimeExceeded` packet.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum IcmpTimeExceededCode {
    /// Time to live exceeded in transit.
    TtlExpired,
    /// Fragment reassembly time exceeded.
    FragmentReassembly,
    Unknown(u8),
}

impl From<IcmpCode> for IcmpTimeExceededCode {
    fn from(val: IcmpCode) -> Self {
        match val {
            IcmpCode(0) => Self::TtlExpired,
            IcmpCode(1) => Self::FragmentReassembly,
            IcmpCode(id) => Self::Unknown(id),
        }
    }
}

const TYPE_OFFSET: usize = 0;
const CODE_OFFSET: usize = 1;
const CHECKSUM_OFFSET: usize = 2;

/// The fixed size of every `ICMPv4` header handled here.
const HEADER_SIZE: usize = 8;

/// Accessors for the type, code and checksum fields shared by all `ICMPv4`
/// packets.
macro_rules! icmp_common_fields {
    () => {
        #[must_use]
        pub fn get_icmp_type(&self) -> $crate::icmpv4::IcmpType {
            $crate::icmpv4::IcmpType::from(self.buf.read($crate::icmpv4::TYPE_OFFSET))
        }

        #[must_use]
        pub fn get_icmp_code(&self) -> $crate::icmpv4::IcmpCode {
            $crate::icmpv4::IcmpCode::from(self.buf.read($crate::icmpv4::CODE_OFFSET))
        }

        #[must_use]
        pub fn get_checksum(&self) -> u16 {
            self.buf.get_u16($crate::icmpv4::CHECKSUM_OFFSET)
        }

        pub fn set_icmp_type(&mut self, val: $crate::icmpv4::IcmpType) {
            *self.buf.write($crate::icmpv4::TYPE_OFFSET) = val.id();
        }

        pub fn set_icmp_code(&mut self, val: $crate::icmpv4::IcmpCode) {
            *self.buf.write($crate::icmpv4::CODE_OFFSET) = val.0;
        }

        pub fn set_checksum(&mut self, val: u16) {
            self.buf.set_u16($crate::icmpv4::CHECKSUM_OFFSET, val);
        }

        #[must_use]
        pub fn packet(&self) -> &[u8] {
            self.buf.as_slice()
        }

        /// The bytes following the 8 byte header.
        #[must_use]
        pub fn payload(&self) -> &[u8] {
            &self.buf.as_slice()[$crate::icmpv4::HEADER_SIZE..]
        }

        /// Copy `vals` into the packet immediately after the 8 byte header.
        pub fn set_payload(&mut self, vals: &[u8]) {
            let start = $crate::icmpv4::HEADER_SIZE;
            self.buf.as_slice_mut()[start..start + vals.len()].copy_from_slice(vals);
        }
    };
}

/// A generic `ICMPv4` packet, used to inspect the type before choosing a
/// more specific view.
pub struct IcmpPacket<'a> {
    buf: Buffer<'a>,
}

impl<'a> IcmpPacket<'a> {
    pub fn new(packet: &'a mut [u8]) -> Result<Self> {
        Ok(Self {
            buf: Buffer::mutable(packet, "IcmpPacket", Self::minimum_packet_size())?,
        })
    }

    pub fn new_view(packet: &'a [u8]) -> Result<Self> {
        Ok(Self {
            buf: Buffer::immutable(packet, "IcmpPacket", Self::minimum_packet_size())?,
        })
    }

    #[must_use]
    pub const fn minimum_packet_size() -> usize {
        HEADER_SIZE
    }

    icmp_common_fields!();
}

impl Debug for IcmpPacket<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IcmpPacket")
            .field("icmp_type", &self.get_icmp_type())
            .field("icmp_code", &self.get_icmp_code())
            .field("checksum", &self.get_checksum())
            .finish()
    }
}

/// `EchoRequest` and `EchoReply` packets, which share a layout.
pub mod echo {
    use crate::buffer::Buffer;
    use crate::error::Result;
    use crate::fmt_payload;
    use std::fmt::{Debug, Formatter};

    const IDENTIFIER_OFFSET: usize = 4;
    const SEQUENCE_OFFSET: usize = 6;

    /// An `ICMPv4` echo packet.
    pub struct EchoPacket<'a> {
        buf: Buffer<'a>,
    }

    impl<'a> EchoPacket<'a> {
        pub fn new(packet: &'a mut [u8]) -> Result<Self> {
            Ok(Self {
                buf: Buffer::mutable(packet, "EchoPacket", Self::minimum_packet_size())?,
            })
        }

        pub fn new_view(packet: &'a [u8]) -> Result<Self> {
            Ok(Self {
                buf: Buffer::immutable(packet, "EchoPacket", Self::minimum_packet_size())?,
            })
        }

        #[must_use]
        pub const fn minimum_packet_size() -> usize {
            super::HEADER_SIZE
        }

        icmp_common_fields!();

        #[must_use]
        pub fn get_identifier(&self) -> u16 {
            self.buf.get_u16(IDENTIFIER_OFFSET)
        }

        #[must_use]
        pub fn get_sequence(&self) -> u16 {
            self.buf.get_u16(SEQUENCE_OFFSET)
        }

        pub fn set_identifier(&mut self, val: u16) {
            self.buf.set_u16(IDENTIFIER_OFFSET, val);
        }

        pub fn set_sequence(&mut self, val: u16) {
            self.buf.set_u16(SEQUENCE_OFFSET, val);
        }
    }

    impl Debug for EchoPacket<'_> {
        fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("EchoPacket")
                .field("icmp_type", &self.get_icmp_type())
                .field("icmp_code", &self.get_icmp_code())
                .field("checksum", &self.get_checksum())
                .field("identifier", &self.get_identifier())
                .field("sequence", &self.get_sequence())
                .field("payload", &fmt_payload(self.payload()))
                .finish()
        }
    }
}

/// `TimeExceeded` packets.
pub mod time_exceeded {
    use crate::buffer::Buffer;
    use crate::error::Result;
    use crate::fmt_payload;
    use std::fmt::{Debug, Formatter};

    /// An `ICMPv4` time exceeded packet.
    ///
    /// The payload holds the leading bytes of the datagram which expired,
    /// starting with its `IPv4` header.
    pub struct TimeExceededPacket<'a> {
        buf: Buffer<'a>,
    }

    impl<'a> TimeExceededPacket<'a> {
        pub fn new(packet: &'a mut [u8]) -> Result<Self> {
            Ok(Self {
                buf: Buffer::mutable(packet, "TimeExceededPacket", Self::minimum_packet_size())?,
            })
        }

        pub fn new_view(packet: &'a [u8]) -> Result<Self> {
            Ok(Self {
                buf: Buffer::immutable(
                    packet,
                    "TimeExceededPacket",
                    Self::minimum_packet_size(),
                )?,
            })
        }

        #[must_use]
        pub const fn minimum_packet_size() -> usize {
            super::HEADER_SIZE
        }

        icmp_common_fields!();
    }

    impl Debug for TimeExceededPacket<'_> {
        fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("TimeExceededPacket")
                .field("icmp_type", &self.get_icmp_type())
                .field("icmp_code", &self.get_icmp_code())
                .field("checksum", &self.get_checksum())
                .field("payload", &fmt_payload(self.payload()))
                .finish()
        }
    }
}
