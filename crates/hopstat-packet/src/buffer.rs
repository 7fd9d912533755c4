use crate::error::{Error, Result};

/// Packet storage, either a read-only view or a writable slice.
#[derive(Debug)]
pub enum Buffer<'a> {
    Immutable(&'a [u8]),
    Mutable(&'a mut [u8]),
}

impl<'a> Buffer<'a> {
    /// Wrap a writable slice which must hold at least `minimum` bytes.
    pub fn mutable(packet: &'a mut [u8], name: &str, minimum: usize) -> Result<Self> {
        if packet.len() < minimum {
            return Err(Error::insufficient(name, minimum, packet.len()));
        }
        Ok(Self::Mutable(packet))
    }

    /// Wrap a read-only slice which must hold at least `minimum` bytes.
    pub fn immutable(packet: &'a [u8], name: &str, minimum: usize) -> Result<Self> {
        if packet.len() < minimum {
            return Err(Error::insufficient(name, minimum, packet.len()));
        }
        Ok(Self::Immutable(packet))
    }

    pub fn as_slice(&self) -> &[u8] {
        match self {
            Buffer::Immutable(packet) => packet,
            Buffer::Mutable(packet) => packet,
        }
    }

    /// # Panics
    ///
    /// Panics if the buffer is a read-only view.
    pub fn as_slice_mut(&mut self) -> &mut [u8] {
        match self {
            Buffer::Immutable(_) => panic!("write operation called on readonly buffer"),
            Buffer::Mutable(packet) => packet,
        }
    }

    pub fn read(&self, offset: usize) -> u8 {
        self.as_slice()[offset]
    }

    pub fn write(&mut self, offset: usize) -> &mut u8 {
        &mut self.as_slice_mut()[offset]
    }

    /// Read `N` bytes starting at `offset`.
    pub fn get_bytes<const N: usize>(&self, offset: usize) -> [u8; N] {
        core::array::from_fn(|i| self.read(offset + i))
    }

    /// Write `N` bytes starting at `offset`.
    pub fn set_bytes<const N: usize>(&mut self, offset: usize, bytes: [u8; N]) {
        self.as_slice_mut()[offset..offset + N].copy_from_slice(&bytes);
    }

    pub fn get_u16(&self, offset: usize) -> u16 {
        u16::from_be_bytes(self.get_bytes(offset))
    }

    pub fn set_u16(&mut self, offset: usize, val: u16) {
        self.set_bytes(offset, val.to_be_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytemuck::{Pod, Zeroable};

    #[derive(Debug, Copy, Clone, PartialEq, Eq, Pod, Zeroable)]
    #[repr(C)]
    struct Word {
        hi: u8,
        lo: u8,
    }

    #[test]
    fn test_too_small() {
        let buf = [0_u8; 3];
        let err = Buffer::immutable(&buf, "Test", 4).unwrap_err();
        assert_eq!(Error::InsufficientPacketBuffer(String::from("Test"), 4, 3), err);
        let mut buf = [0_u8; 0];
        assert!(Buffer::mutable(&mut buf, "Test", 1).is_err());
    }

    #[test]
    fn test_read_write() {
        let mut buf = [0_u8; 6];
        let mut buffer = Buffer::mutable(&mut buf, "Test", 6).unwrap();
        buffer.set_u16(0, 0x1234);
        *buffer.write(2) = 0xff;
        buffer.set_bytes(3, [7, 8, 9]);
        assert_eq!(0x1234, buffer.get_u16(0));
        assert_eq!(0xff, buffer.read(2));
        assert_eq!([7, 8, 9], buffer.get_bytes(3));
        assert_eq!(&[0x12, 0x34, 0xff, 7, 8, 9], buffer.as_slice());
    }

    #[test]
    fn test_pod_round_trip() {
        let mut buf = [0_u8; 2];
        let mut buffer = Buffer::mutable(&mut buf, "Test", 2).unwrap();
        let word = Word { hi: 0xab, lo: 0xcd };
        buffer.set_bytes::<2>(0, bytemuck::cast(word));
        assert_eq!(0xabcd, buffer.get_u16(0));
        let read: Word = bytemuck::cast(buffer.get_bytes::<2>(0));
        assert_eq!(word, read);
    }

    #[test]
    #[should_panic(expected = "write operation called on readonly buffer")]
    fn test_immutable_cannot_write() {
        let buf = [0_u8; 2];
        let mut buffer = Buffer::immutable(&buf, "Test", 2).unwrap();
        buffer.set_u16(0, 1);
    }
}
