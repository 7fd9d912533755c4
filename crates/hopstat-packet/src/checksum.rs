//! The Internet checksum (RFC 1071) as used by `IPv4` headers and `ICMPv4`.

/// Word index of the checksum field in an `IPv4` header.
const IPV4_CHECKSUM_WORD: usize = 5;

/// Word index of the checksum field in an `ICMPv4` header.
const ICMP_CHECKSUM_WORD: usize = 1;

/// Calculate the checksum for an `IPv4` header.
///
/// The existing value of the checksum field is ignored.
#[must_use]
pub fn ipv4_header_checksum(header: &[u8]) -> u16 {
    checksum(header, IPV4_CHECKSUM_WORD)
}

/// Calculate the checksum for an `ICMPv4` packet (header and payload).
///
/// The existing value of the checksum field is ignored.
#[must_use]
pub fn icmp_ipv4_checksum(packet: &[u8]) -> u16 {
    checksum(packet, ICMP_CHECKSUM_WORD)
}

/// One's complement of the one's complement sum of all 16-bit words, skipping
/// the word at `ignore_word`.  A trailing odd byte is padded with zero.
fn checksum(data: &[u8], ignore_word: usize) -> u16 {
    if data.is_empty() {
        return 0;
    }
    let mut words = data.chunks_exact(2);
    let mut sum: u32 = words
        .by_ref()
        .enumerate()
        .filter(|(index, _)| *index != ignore_word)
        .map(|(_, word)| u32::from(u16::from_be_bytes([word[0], word[1]])))
        .sum();
    if let [last] = words.remainder() {
        if data.len() / 2 != ignore_word {
            sum += u32::from(*last) << 8;
        }
    }
    fold(sum)
}

const fn fold(mut sum: u32) -> u16 {
    while sum >> 16 != 0 {
        sum = (sum >> 16) + (sum & 0xffff);
    }
    !sum as u16
}
