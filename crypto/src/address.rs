//! Script address derivation and decoding.
//!
//! Address format: bech32(hrp, header ‖ payload)
//!
//! Header: high nibble is the address type, low nibble the network bit.
//! Enterprise script addresses use type `0b0111` and carry a 28-byte
//! Blake2b-224 validator hash as payload.
//! HRP: `addr` on mainnet, `addr_test` on every test network.
//! Checksum: BIP-173 bech32 polymod (6 characters).

use agora_types::{NetworkId, WalletAddress};
use thiserror::Error;

/// Bech32 alphabet (32 chars).
const CHARSET: &[u8; 32] = b"qpzry9x8gf2tvdw0s3jn54khce6mua7l";

/// Reverse lookup table: ASCII byte → 5-bit value (0xFF = invalid).
const CHARSET_DECODE: [u8; 128] = {
    let mut table = [0xFFu8; 128];
    let alpha = CHARSET;
    let mut i = 0;
    while i < 32 {
        table[alpha[i] as usize] = i as u8;
        i += 1;
    }
    table
};

/// Generator coefficients of the bech32 BCH code.
const GENERATOR: [u32; 5] = [0x3b6a57b2, 0x26508e6d, 0x1ea119fa, 0x3d4233dd, 0x2a1462b3];

/// Number of checksum characters.
const CHECKSUM_LEN: usize = 6;

/// Address type nibble for an enterprise address paying to a script.
const ENTERPRISE_SCRIPT: u8 = 0b0111;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("address has no separator")]
    MissingSeparator,

    #[error("address mixes upper and lower case")]
    MixedCase,

    #[error("invalid character {0:?}")]
    InvalidChar(char),

    #[error("checksum mismatch")]
    BadChecksum,

    #[error("non-zero padding bits")]
    BadPadding,

    #[error("not an enterprise script address")]
    NotScriptAddress,
}

fn polymod(values: &[u8]) -> u32 {
    let mut chk: u32 = 1;
    for &v in values {
        let top = chk >> 25;
        chk = ((chk & 0x01ff_ffff) << 5) ^ v as u32;
        for (i, g) in GENERATOR.iter().enumerate() {
            if (top >> i) & 1 == 1 {
                chk ^= g;
            }
        }
    }
    chk
}

fn hrp_expand(hrp: &str) -> Vec<u8> {
    let bytes = hrp.as_bytes();
    let mut out = Vec::with_capacity(bytes.len() * 2 + 1);
    out.extend(bytes.iter().map(|b| b >> 5));
    out.push(0);
    out.extend(bytes.iter().map(|b| b & 0x1f));
    out
}

/// Regroup 8-bit bytes into 5-bit values, zero-padding the tail.
fn to_five_bit(bytes: &[u8]) -> Vec<u8> {
    let mut result = Vec::with_capacity((bytes.len() * 8).div_ceil(5));
    let mut buffer: u32 = 0;
    let mut bits_in_buffer = 0;

    for &byte in bytes {
        buffer = (buffer << 8) | byte as u32;
        bits_in_buffer += 8;
        while bits_in_buffer >= 5 {
            bits_in_buffer -= 5;
            result.push(((buffer >> bits_in_buffer) & 0x1f) as u8);
        }
    }
    if bits_in_buffer > 0 {
        result.push(((buffer << (5 - bits_in_buffer)) & 0x1f) as u8);
    }
    result
}

/// Regroup 5-bit values into bytes. Leftover bits must be zero padding.
fn from_five_bit(values: &[u8]) -> Result<Vec<u8>, AddressError> {
    let mut result = Vec::with_capacity(values.len() * 5 / 8);
    let mut buffer: u32 = 0;
    let mut bits_in_buffer = 0;

    for &v in values {
        buffer = (buffer << 5) | v as u32;
        bits_in_buffer += 5;
        if bits_in_buffer >= 8 {
            bits_in_buffer -= 8;
            result.push((buffer >> bits_in_buffer) as u8);
        }
    }
    if bits_in_buffer >= 5 || (buffer & ((1 << bits_in_buffer) - 1)) != 0 {
        return Err(AddressError::BadPadding);
    }
    Ok(result)
}

/// Encode `payload` as bech32 under `hrp`.
pub fn encode_bech32(hrp: &str, payload: &[u8]) -> String {
    let data = to_five_bit(payload);
    let mut values = hrp_expand(hrp);
    values.extend_from_slice(&data);
    values.extend_from_slice(&[0u8; CHECKSUM_LEN]);
    let checksum = polymod(&values) ^ 1;

    let mut out = String::with_capacity(hrp.len() + 1 + data.len() + CHECKSUM_LEN);
    out.push_str(hrp);
    out.push('1');
    for v in data {
        out.push(CHARSET[v as usize] as char);
    }
    for i in 0..CHECKSUM_LEN {
        let v = (checksum >> (5 * (5 - i))) & 0x1f;
        out.push(CHARSET[v as usize] as char);
    }
    out
}

/// Decode a bech32 string into its human-readable part and payload bytes.
pub fn decode_bech32(s: &str) -> Result<(String, Vec<u8>), AddressError> {
    let has_lower = s.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = s.chars().any(|c| c.is_ascii_uppercase());
    if has_lower && has_upper {
        return Err(AddressError::MixedCase);
    }
    let s = s.to_ascii_lowercase();
    let sep = s.rfind('1').ok_or(AddressError::MissingSeparator)?;
    if sep == 0 || sep + 1 + CHECKSUM_LEN > s.len() {
        return Err(AddressError::MissingSeparator);
    }
    let (hrp, rest) = (&s[..sep], &s[sep + 1..]);

    let mut values = Vec::with_capacity(rest.len());
    for c in rest.chars() {
        let v = if c.is_ascii() {
            CHARSET_DECODE[c as usize]
        } else {
            0xFF
        };
        if v == 0xFF {
            return Err(AddressError::InvalidChar(c));
        }
        values.push(v);
    }

    let mut check = hrp_expand(hrp);
    check.extend_from_slice(&values);
    if polymod(&check) != 1 {
        return Err(AddressError::BadChecksum);
    }

    let data = &values[..values.len() - CHECKSUM_LEN];
    Ok((hrp.to_string(), from_five_bit(data)?))
}

/// Derive the enterprise script address of a validator hash.
pub fn encode_script_address(network: NetworkId, script_hash: &[u8; 28]) -> WalletAddress {
    let mut payload = Vec::with_capacity(29);
    payload.push((ENTERPRISE_SCRIPT << 4) | network.address_tag());
    payload.extend_from_slice(script_hash);
    let encoded = encode_bech32(network.address_hrp(), &payload);
    // Bech32 output never contains whitespace, so wrapping cannot fail.
    WalletAddress::new(encoded).unwrap_or_else(|_| unreachable!("bech32 text is never blank"))
}

/// Extract the validator hash from an enterprise script address.
pub fn decode_script_address(address: &str) -> Result<[u8; 28], AddressError> {
    let (_, payload) = decode_bech32(address)?;
    if payload.len() != 29 || payload[0] >> 4 != ENTERPRISE_SCRIPT {
        return Err(AddressError::NotScriptAddress);
    }
    let mut hash = [0u8; 28];
    hash.copy_from_slice(&payload[1..]);
    Ok(hash)
}

/// Guess the network an address belongs to from its prefix.
///
/// Test networks share one prefix, so `addr_test1…` maps to
/// [`NetworkId::Preprod`]. Unknown prefixes fall back to mainnet.
pub fn network_from_address(address: &str) -> NetworkId {
    if address.starts_with("addr_test1") {
        NetworkId::Preprod
    } else if address.starts_with("addr1") {
        NetworkId::Mainnet
    } else {
        tracing::warn!(address, "could not determine network from address, defaulting to mainnet");
        NetworkId::Mainnet
    }
}

/// Whether `address` looks like a raw hex-encoded address rather than bech32.
pub fn is_hex_address(address: &str) -> bool {
    address.len() >= 56
        && address.bytes().all(|b| b.is_ascii_hexdigit())
        && !address.starts_with("addr1")
        && !address.starts_with("addr_test1")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bip173_vectors_decode() {
        assert!(decode_bech32("A12UEL5L").is_ok());
        assert!(decode_bech32("a12uel5l").is_ok());
        assert!(decode_bech32("abcdef1qpzry9x8gf2tvdw0s3jn54khce6mua7lmqqqxw").is_ok());
    }

    #[test]
    fn bip173_invalid_vectors_rejected() {
        assert_eq!(decode_bech32("A12UeL5L"), Err(AddressError::MixedCase));
        assert_eq!(decode_bech32("pzry9x0s0muk"), Err(AddressError::MissingSeparator));
        assert_eq!(decode_bech32("a12uel5m"), Err(AddressError::BadChecksum));
    }

    #[test]
    fn script_address_roundtrip() {
        let hash = [0x5au8; 28];
        let addr = encode_script_address(NetworkId::Preprod, &hash);
        assert!(addr.as_str().starts_with("addr_test1w"));
        assert_eq!(decode_script_address(addr.as_str()).unwrap(), hash);
    }

    #[test]
    fn mainnet_script_address_prefix() {
        let addr = encode_script_address(NetworkId::Mainnet, &[1u8; 28]);
        // Header 0x71 encodes to a leading 'w' in the data part.
        assert!(addr.as_str().starts_with("addr1w"));
        assert_eq!(network_from_address(addr.as_str()), NetworkId::Mainnet);
    }

    #[test]
    fn derive_is_deterministic() {
        let a1 = encode_script_address(NetworkId::Preview, &[9u8; 28]);
        let a2 = encode_script_address(NetworkId::Preview, &[9u8; 28]);
        assert_eq!(a1, a2);
    }

    #[test]
    fn corrupted_address_rejected() {
        let addr = encode_script_address(NetworkId::Mainnet, &[3u8; 28]);
        let mut bad = addr.as_str().to_string();
        let last = bad.pop().unwrap();
        bad.push(if last == 'q' { 'p' } else { 'q' });
        assert_eq!(decode_script_address(&bad), Err(AddressError::BadChecksum));
    }

    #[test]
    fn key_address_is_not_a_script_address() {
        let mut payload = vec![0x61u8];
        payload.extend_from_slice(&[7u8; 28]);
        let addr = encode_bech32("addr", &payload);
        assert_eq!(decode_script_address(&addr), Err(AddressError::NotScriptAddress));
    }

    #[test]
    fn network_detection() {
        assert_eq!(network_from_address("addr_test1qxyz"), NetworkId::Preprod);
        assert_eq!(network_from_address("addr1qxyz"), NetworkId::Mainnet);
        assert_eq!(network_from_address("stake1u"), NetworkId::Mainnet);
    }

    #[test]
    fn hex_address_detection() {
        assert!(is_hex_address(&"01".repeat(29)));
        assert!(!is_hex_address("addr1qxyz"));
        assert!(!is_hex_address("abcd"));
    }

    #[test]
    fn five_bit_roundtrip() {
        let data = [0xDE, 0xAD, 0xBE, 0xEF, 0x42];
        assert_eq!(from_five_bit(&to_five_bit(&data)).unwrap(), data);
    }
}
