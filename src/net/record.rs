//! Portable layout of kernel enumeration records.
//!
//! The interface-list query fills a byte buffer with fixed-size records,
//! each carrying a NUL-padded interface name, an address-family tag and
//! an address payload. On Unix the layout is exactly `struct ifreq`, so
//! the real kernel's buffer can be partitioned without copying; mock
//! kernels encode the same layout with [`encode_into`].

/// Interface name field length (IFNAMSIZ).
pub const NAME_LEN: usize = 16;

/// Offset of the address-family tag within a record.
pub const FAMILY_OFFSET: usize = NAME_LEN;

/// Offset of the address payload (hardware bytes for link records).
pub const DATA_OFFSET: usize = NAME_LEN + 2;

/// Size of one enumeration record.
#[cfg(unix)]
pub const RECORD_LEN: usize = std::mem::size_of::<libc::ifreq>();
#[cfg(not(unix))]
pub const RECORD_LEN: usize = 40;

/// IPv4 address family tag (AF_INET).
pub const FAMILY_INET: u16 = 2;

/// Link-layer address family tag (BSD-style AF_LINK).
pub const FAMILY_LINK: u16 = 18;

/// Address-family tag of a record.
pub fn family(record: &[u8]) -> u16 {
    u16::from_ne_bytes([record[FAMILY_OFFSET], record[FAMILY_OFFSET + 1]])
}

/// Interface name of a record, trimmed at the first NUL.
pub fn name(record: &[u8]) -> String {
    let field = &record[..NAME_LEN];
    let end = field.iter().position(|&b| b == 0).unwrap_or(NAME_LEN);
    String::from_utf8_lossy(&field[..end]).into_owned()
}

/// Address payload of a record.
pub fn data(record: &[u8]) -> &[u8] {
    &record[DATA_OFFSET..]
}

/// Encodes one record into `out`, which must be `RECORD_LEN` bytes.
/// Names longer than the name field are truncated.
pub fn encode_into(out: &mut [u8], name: &str, family: u16, data: &[u8]) {
    assert_eq!(out.len(), RECORD_LEN);
    out.fill(0);

    let name_bytes = name.as_bytes();
    let n = name_bytes.len().min(NAME_LEN - 1);
    out[..n].copy_from_slice(&name_bytes[..n]);

    out[FAMILY_OFFSET..FAMILY_OFFSET + 2].copy_from_slice(&family.to_ne_bytes());

    let d = data.len().min(RECORD_LEN - DATA_OFFSET);
    out[DATA_OFFSET..DATA_OFFSET + d].copy_from_slice(&data[..d]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_decode_roundtrip() {
        let mut rec = vec![0u8; RECORD_LEN];
        encode_into(&mut rec, "eth0", FAMILY_INET, &[10, 0, 0, 5]);

        assert_eq!(name(&rec), "eth0");
        assert_eq!(family(&rec), FAMILY_INET);
        assert_eq!(&data(&rec)[..4], &[10, 0, 0, 5]);
    }

    #[test]
    fn test_encode_truncates_long_name() {
        let mut rec = vec![0u8; RECORD_LEN];
        encode_into(&mut rec, "averyverylonginterfacename", FAMILY_INET, &[]);
        assert_eq!(name(&rec).len(), NAME_LEN - 1);
    }

    #[test]
    fn test_record_len_holds_header_and_payload() {
        // name + family + at least a hardware address must fit
        assert!(RECORD_LEN >= DATA_OFFSET + 6);
    }
}
