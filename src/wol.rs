use pnet::util::MacAddr;

use thiserror::Error;

pub const MAC_LEN: usize = 6;
pub const MAC_REPETITIONS: usize = 16;

/// 6 bytes of sync header plus 16 repetitions of a MAC address
pub const WOL_PKT_SIZE: usize = MAC_LEN + MAC_REPETITIONS * MAC_LEN;

const SYNC_HEADER: [u8; MAC_LEN] = [ 0xff; MAC_LEN ];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("payload is not a magic packet")]
    NotMagic,
}

/// Parses a datagram payload as a WakeOnLan magic packet and returns the
/// target MAC address.
///
/// The sync header must sit at offset 0 and be a run of exactly six 0xff
/// bytes; runs of five or seven are rejected. After the header, every 6-byte
/// group must be byte-identical to the first one. Fewer than the canonical
/// 16 repetitions are accepted as long as at least one is present and all of
/// them match.
pub fn parse_magic_packet(payload: &[u8]) -> Result<MacAddr, ParseError> {
    let run = payload.iter().take_while(|&&b| b == 0xff).count();
    if run != SYNC_HEADER.len() {
        return Err(ParseError::NotMagic);
    }

    let reps = &payload[SYNC_HEADER.len()..];
    if reps.is_empty() || reps.len() % MAC_LEN != 0 {
        return Err(ParseError::NotMagic);
    }

    let target = &reps[..MAC_LEN];
    if reps.chunks_exact(MAC_LEN).any(|rep| rep != target) {
        return Err(ParseError::NotMagic);
    }

    Ok(MacAddr::new(
        target[0], target[1], target[2], target[3], target[4], target[5],
    ))
}

/// Builds the canonical 102-byte magic packet for a target MAC address.
pub fn build_magic_packet(target: MacAddr) -> [u8; WOL_PKT_SIZE] {
    let mut pkt = [0u8; WOL_PKT_SIZE];
    pkt[..MAC_LEN].copy_from_slice(&SYNC_HEADER);

    let octets = target.octets();
    for rep in pkt[MAC_LEN..].chunks_exact_mut(MAC_LEN) {
        rep.copy_from_slice(&octets);
    }

    pkt
}

#[cfg(test)]
mod tests {
    use super::*;

    const TARGET: MacAddr = MacAddr(0xde, 0xad, 0xbe, 0xef, 0xaa, 0x55);

    #[test]
    fn round_trip() {
        let pkt = build_magic_packet(TARGET);
        assert_eq!(pkt.len(), WOL_PKT_SIZE);
        assert_eq!(parse_magic_packet(&pkt), Ok(TARGET));
    }

    #[test]
    fn build_layout() {
        let pkt = build_magic_packet(TARGET);
        assert!(pkt[..6].iter().all(|&b| b == 0xff));
        for i in 0..MAC_REPETITIONS {
            assert_eq!(&pkt[6 + i * 6..12 + i * 6], &TARGET.octets());
        }
    }

    #[test]
    fn build_is_deterministic() {
        assert_eq!(build_magic_packet(TARGET), build_magic_packet(TARGET));
    }

    #[test]
    fn rejects_short_header_run() {
        let mut pkt = vec![0xff; 5];
        for _ in 0..16 {
            pkt.extend_from_slice(&TARGET.octets());
        }
        assert_eq!(parse_magic_packet(&pkt), Err(ParseError::NotMagic));
    }

    #[test]
    fn rejects_long_header_run() {
        let mut pkt = vec![0xff; 7];
        for _ in 0..16 {
            pkt.extend_from_slice(&[0x55, 0xaa, 0x55, 0xaa, 0x55, 0xaa]);
        }
        assert_eq!(parse_magic_packet(&pkt), Err(ParseError::NotMagic));
    }

    #[test]
    fn rejects_header_not_at_offset_zero() {
        let mut pkt = vec![0x00, 0x01];
        pkt.extend_from_slice(&build_magic_packet(TARGET));
        assert_eq!(parse_magic_packet(&pkt), Err(ParseError::NotMagic));
    }

    #[test]
    fn rejects_mismatched_repetition() {
        let mut pkt = build_magic_packet(TARGET);
        // flip one byte in the 7th copy
        pkt[6 + 6 * 6 + 3] ^= 0x01;
        assert_eq!(parse_magic_packet(&pkt), Err(ParseError::NotMagic));
    }

    #[test]
    fn rejects_partial_trailing_group() {
        let mut pkt = Vec::new();
        pkt.extend_from_slice(&[0xff; 6]);
        pkt.extend_from_slice(&TARGET.octets());
        pkt.extend_from_slice(&TARGET.octets()[..5]);
        assert_eq!(parse_magic_packet(&pkt), Err(ParseError::NotMagic));
    }

    #[test]
    fn rejects_truncated_buffer() {
        assert_eq!(parse_magic_packet(&[]), Err(ParseError::NotMagic));
        assert_eq!(parse_magic_packet(&[0xff; 6]), Err(ParseError::NotMagic));
        assert_eq!(
            parse_magic_packet(&build_magic_packet(TARGET)[..11]),
            Err(ParseError::NotMagic)
        );
    }

    #[test]
    fn accepts_fewer_repetitions() {
        let mut pkt = Vec::new();
        pkt.extend_from_slice(&[0xff; 6]);
        for _ in 0..3 {
            pkt.extend_from_slice(&TARGET.octets());
        }
        assert_eq!(parse_magic_packet(&pkt), Ok(TARGET));
    }

    #[test]
    fn round_trip_exception_for_ff_leading_mac() {
        // a target whose first octet is 0xff extends the header run past
        // six bytes, so the strict parser cannot recover it
        let target = MacAddr(0xff, 0x00, 0x11, 0x22, 0x33, 0x44);
        let pkt = build_magic_packet(target);
        assert_eq!(parse_magic_packet(&pkt), Err(ParseError::NotMagic));
    }

    #[test]
    fn rejects_garbage() {
        let pkt = [0x42u8; WOL_PKT_SIZE];
        assert_eq!(parse_magic_packet(&pkt), Err(ParseError::NotMagic));
    }
}
