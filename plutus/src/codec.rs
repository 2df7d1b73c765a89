//! Canonical CBOR codec for [`PlutusData`].
//!
//! Encoding rules, matching the settlement SDK byte for byte:
//! - constructor alternatives 0..=6 use tags 121..=127, 7..=127 use tags
//!   1280..=1400, anything larger uses tag 102 over `[alternative, fields]`
//! - non-empty lists (constructor fields included) are indefinite-length
//!   arrays; the empty list is `0x80`
//! - byte strings longer than 64 bytes are split into 64-byte chunks inside an
//!   indefinite byte string
//! - integers outside the 64-bit range use bignum tags 2 and 3
//! - maps are definite-length
//!
//! The decoder accepts definite and indefinite forms alike.

use crate::data::PlutusData;
use crate::error::PlutusError;

const MAJOR_UINT: u8 = 0;
const MAJOR_NINT: u8 = 1;
const MAJOR_BYTES: u8 = 2;
const MAJOR_ARRAY: u8 = 4;
const MAJOR_MAP: u8 = 5;
const MAJOR_TAG: u8 = 6;

const INDEFINITE: u8 = 31;
const BREAK: u8 = 0xff;

const TAG_POS_BIGNUM: u64 = 2;
const TAG_NEG_BIGNUM: u64 = 3;
const TAG_GENERAL_CONSTR: u64 = 102;
const TAG_SMALL_CONSTR: u64 = 121;
const TAG_LARGE_CONSTR: u64 = 1280;

/// Maximum byte-string chunk length.
const CHUNK_LEN: usize = 64;

/// Maximum nesting depth the decoder follows.
pub const MAX_DEPTH: usize = 128;

/// Encode a data value to canonical CBOR.
pub fn encode(data: &PlutusData) -> Vec<u8> {
    let mut out = Vec::new();
    encode_into(data, &mut out);
    out
}

fn write_head(out: &mut Vec<u8>, major: u8, value: u64) {
    let m = major << 5;
    match value {
        0..=23 => out.push(m | value as u8),
        24..=0xff => {
            out.push(m | 24);
            out.push(value as u8);
        }
        0x100..=0xffff => {
            out.push(m | 25);
            out.extend_from_slice(&(value as u16).to_be_bytes());
        }
        0x1_0000..=0xffff_ffff => {
            out.push(m | 26);
            out.extend_from_slice(&(value as u32).to_be_bytes());
        }
        _ => {
            out.push(m | 27);
            out.extend_from_slice(&value.to_be_bytes());
        }
    }
}

fn write_bytes(out: &mut Vec<u8>, bytes: &[u8]) {
    if bytes.len() <= CHUNK_LEN {
        write_head(out, MAJOR_BYTES, bytes.len() as u64);
        out.extend_from_slice(bytes);
    } else {
        out.push((MAJOR_BYTES << 5) | INDEFINITE);
        for chunk in bytes.chunks(CHUNK_LEN) {
            write_head(out, MAJOR_BYTES, chunk.len() as u64);
            out.extend_from_slice(chunk);
        }
        out.push(BREAK);
    }
}

fn write_list(out: &mut Vec<u8>, items: &[PlutusData]) {
    if items.is_empty() {
        write_head(out, MAJOR_ARRAY, 0);
        return;
    }
    out.push((MAJOR_ARRAY << 5) | INDEFINITE);
    for item in items {
        encode_into(item, out);
    }
    out.push(BREAK);
}

fn write_int(out: &mut Vec<u8>, value: i128) {
    if value >= 0 {
        match u64::try_from(value) {
            Ok(v) => write_head(out, MAJOR_UINT, v),
            Err(_) => {
                write_head(out, MAJOR_TAG, TAG_POS_BIGNUM);
                write_bytes(out, &minimal_be(value as u128));
            }
        }
    } else {
        // CBOR negative integers carry -1 - n.
        let magnitude = (-1 - value) as u128;
        match u64::try_from(magnitude) {
            Ok(v) => write_head(out, MAJOR_NINT, v),
            Err(_) => {
                write_head(out, MAJOR_TAG, TAG_NEG_BIGNUM);
                write_bytes(out, &minimal_be(magnitude));
            }
        }
    }
}

fn minimal_be(value: u128) -> Vec<u8> {
    let bytes = value.to_be_bytes();
    let start = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
    bytes[start..].to_vec()
}

fn encode_into(data: &PlutusData, out: &mut Vec<u8>) {
    match data {
        PlutusData::Constr {
            alternative,
            fields,
        } => match *alternative {
            alt @ 0..=6 => {
                write_head(out, MAJOR_TAG, TAG_SMALL_CONSTR + alt);
                write_list(out, fields);
            }
            alt @ 7..=127 => {
                write_head(out, MAJOR_TAG, TAG_LARGE_CONSTR + alt - 7);
                write_list(out, fields);
            }
            alt => {
                write_head(out, MAJOR_TAG, TAG_GENERAL_CONSTR);
                write_head(out, MAJOR_ARRAY, 2);
                write_head(out, MAJOR_UINT, alt);
                write_list(out, fields);
            }
        },
        PlutusData::Map(entries) => {
            write_head(out, MAJOR_MAP, entries.len() as u64);
            for (k, v) in entries {
                encode_into(k, out);
                encode_into(v, out);
            }
        }
        PlutusData::List(items) => write_list(out, items),
        PlutusData::Int(i) => write_int(out, *i),
        PlutusData::Bytes(b) => write_bytes(out, b),
    }
}

/// Decode exactly one data value from `bytes`.
pub fn decode(bytes: &[u8]) -> Result<PlutusData, PlutusError> {
    let mut reader = Reader { bytes, pos: 0 };
    let data = reader.data(0)?;
    let rest = bytes.len() - reader.pos;
    if rest != 0 {
        return Err(PlutusError::TrailingBytes(rest));
    }
    Ok(data)
}

/// Length of an item head: a count, or the indefinite marker.
enum Len {
    Definite(u64),
    Indefinite,
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl Reader<'_> {
    fn byte(&mut self) -> Result<u8, PlutusError> {
        let b = *self
            .bytes
            .get(self.pos)
            .ok_or(PlutusError::UnexpectedEof(self.pos))?;
        self.pos += 1;
        Ok(b)
    }

    fn peek(&self) -> Result<u8, PlutusError> {
        self.bytes
            .get(self.pos)
            .copied()
            .ok_or(PlutusError::UnexpectedEof(self.pos))
    }

    fn take(&mut self, n: usize) -> Result<&[u8], PlutusError> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|end| *end <= self.bytes.len())
            .ok_or(PlutusError::UnexpectedEof(self.bytes.len()))?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    /// Read an item head, returning its major type and length argument.
    fn head(&mut self) -> Result<(u8, Len), PlutusError> {
        let offset = self.pos;
        let initial = self.byte()?;
        let major = initial >> 5;
        let info = initial & 0x1f;
        let len = match info {
            0..=23 => Len::Definite(info as u64),
            24 => Len::Definite(self.byte()? as u64),
            25 => Len::Definite(u16::from_be_bytes(self.fixed()?) as u64),
            26 => Len::Definite(u32::from_be_bytes(self.fixed()?) as u64),
            27 => Len::Definite(u64::from_be_bytes(self.fixed()?)),
            INDEFINITE if matches!(major, MAJOR_BYTES | MAJOR_ARRAY | MAJOR_MAP) => Len::Indefinite,
            _ => return Err(PlutusError::Unsupported { major, info, offset }),
        };
        Ok((major, len))
    }

    fn fixed<const N: usize>(&mut self) -> Result<[u8; N], PlutusError> {
        let mut buf = [0u8; N];
        buf.copy_from_slice(self.take(N)?);
        Ok(buf)
    }

    fn at_break(&mut self) -> Result<bool, PlutusError> {
        if self.peek()? == BREAK {
            self.pos += 1;
            return Ok(true);
        }
        Ok(false)
    }

    fn definite(&self, len: Len) -> Result<u64, PlutusError> {
        match len {
            Len::Definite(n) => Ok(n),
            Len::Indefinite => Err(PlutusError::Unsupported {
                major: MAJOR_UINT,
                info: INDEFINITE,
                offset: self.pos,
            }),
        }
    }

    fn data(&mut self, depth: usize) -> Result<PlutusData, PlutusError> {
        if depth > MAX_DEPTH {
            return Err(PlutusError::TooDeep(MAX_DEPTH));
        }
        let offset = self.pos;
        let (major, len) = self.head()?;
        match major {
            MAJOR_UINT => Ok(PlutusData::Int(self.definite(len)? as i128)),
            MAJOR_NINT => Ok(PlutusData::Int(-1 - self.definite(len)? as i128)),
            MAJOR_BYTES => Ok(PlutusData::Bytes(self.byte_string(len)?)),
            MAJOR_ARRAY => Ok(PlutusData::List(self.items(len, depth)?)),
            MAJOR_MAP => {
                let mut entries = Vec::new();
                match len {
                    Len::Definite(n) => {
                        for _ in 0..n {
                            let k = self.data(depth + 1)?;
                            let v = self.data(depth + 1)?;
                            entries.push((k, v));
                        }
                    }
                    Len::Indefinite => {
                        while !self.at_break()? {
                            let k = self.data(depth + 1)?;
                            let v = self.data(depth + 1)?;
                            entries.push((k, v));
                        }
                    }
                }
                Ok(PlutusData::Map(entries))
            }
            MAJOR_TAG => self.tagged(self.definite(len)?, depth),
            _ => Err(PlutusError::Unsupported {
                major,
                info: self.bytes[offset] & 0x1f,
                offset,
            }),
        }
    }

    fn byte_string(&mut self, len: Len) -> Result<Vec<u8>, PlutusError> {
        match len {
            Len::Definite(n) => Ok(self.take(n as usize)?.to_vec()),
            Len::Indefinite => {
                let mut out = Vec::new();
                while !self.at_break()? {
                    let offset = self.pos;
                    let (major, chunk_len) = self.head()?;
                    if major != MAJOR_BYTES {
                        return Err(PlutusError::Unsupported {
                            major,
                            info: self.bytes[offset] & 0x1f,
                            offset,
                        });
                    }
                    let n = self.definite(chunk_len)?;
                    out.extend_from_slice(self.take(n as usize)?);
                }
                Ok(out)
            }
        }
    }

    fn items(&mut self, len: Len, depth: usize) -> Result<Vec<PlutusData>, PlutusError> {
        let mut items = Vec::new();
        match len {
            Len::Definite(n) => {
                for _ in 0..n {
                    items.push(self.data(depth + 1)?);
                }
            }
            Len::Indefinite => {
                while !self.at_break()? {
                    items.push(self.data(depth + 1)?);
                }
            }
        }
        Ok(items)
    }

    /// Constructor fields: an array, definite or not.
    fn fields(&mut self, depth: usize) -> Result<Vec<PlutusData>, PlutusError> {
        let offset = self.pos;
        let (major, len) = self.head()?;
        if major != MAJOR_ARRAY {
            return Err(PlutusError::Unsupported {
                major,
                info: self.bytes[offset] & 0x1f,
                offset,
            });
        }
        self.items(len, depth)
    }

    fn tagged(&mut self, tag: u64, depth: usize) -> Result<PlutusData, PlutusError> {
        match tag {
            TAG_SMALL_CONSTR..=127 => Ok(PlutusData::Constr {
                alternative: tag - TAG_SMALL_CONSTR,
                fields: self.fields(depth + 1)?,
            }),
            TAG_LARGE_CONSTR..=1400 => Ok(PlutusData::Constr {
                alternative: tag - TAG_LARGE_CONSTR + 7,
                fields: self.fields(depth + 1)?,
            }),
            TAG_GENERAL_CONSTR => {
                let (major, len) = self.head()?;
                if major != MAJOR_ARRAY || !matches!(len, Len::Definite(2)) {
                    return Err(PlutusError::UnsupportedTag(tag));
                }
                let (major, alt) = self.head()?;
                if major != MAJOR_UINT {
                    return Err(PlutusError::UnsupportedTag(tag));
                }
                Ok(PlutusData::Constr {
                    alternative: self.definite(alt)?,
                    fields: self.fields(depth + 1)?,
                })
            }
            TAG_POS_BIGNUM | TAG_NEG_BIGNUM => {
                let (major, len) = self.head()?;
                if major != MAJOR_BYTES {
                    return Err(PlutusError::UnsupportedTag(tag));
                }
                let raw = self.byte_string(len)?;
                let magnitude = be_to_u128(&raw)?;
                let magnitude = i128::try_from(magnitude).map_err(|_| PlutusError::IntegerOverflow)?;
                Ok(PlutusData::Int(if tag == TAG_POS_BIGNUM {
                    magnitude
                } else {
                    -1 - magnitude
                }))
            }
            other => Err(PlutusError::UnsupportedTag(other)),
        }
    }
}

fn be_to_u128(raw: &[u8]) -> Result<u128, PlutusError> {
    let start = raw.iter().position(|b| *b != 0).unwrap_or(raw.len());
    let significant = &raw[start..];
    if significant.len() > 16 {
        return Err(PlutusError::IntegerOverflow);
    }
    Ok(significant
        .iter()
        .fold(0u128, |acc, b| (acc << 8) | *b as u128))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex_of(data: &PlutusData) -> String {
        hex::encode(encode(data))
    }

    #[test]
    fn small_constructors_use_compact_tags() {
        assert_eq!(hex_of(&PlutusData::unit(0)), "d87980");
        assert_eq!(hex_of(&PlutusData::unit(6)), "d87f80");
        assert_eq!(hex_of(&PlutusData::unit(7)), "d9050080");
        assert_eq!(hex_of(&PlutusData::unit(200)), "d8668218c880");
    }

    #[test]
    fn non_empty_lists_are_indefinite() {
        let d = PlutusData::constr(0, vec![PlutusData::int(1), PlutusData::int(2)]);
        assert_eq!(hex_of(&d), "d8799f0102ff");
        assert_eq!(hex_of(&PlutusData::List(vec![])), "80");
    }

    #[test]
    fn integers() {
        assert_eq!(hex_of(&PlutusData::int(0)), "00");
        assert_eq!(hex_of(&PlutusData::int(23)), "17");
        assert_eq!(hex_of(&PlutusData::int(24)), "1818");
        assert_eq!(hex_of(&PlutusData::int(5_000_000)), "1a004c4b40");
        assert_eq!(hex_of(&PlutusData::int(-1)), "20");
        assert_eq!(hex_of(&PlutusData::int(-500)), "3901f3");
        // 2^64 needs a bignum.
        assert_eq!(hex_of(&PlutusData::int(1i128 << 64)), "c249010000000000000000");
        assert_eq!(hex_of(&PlutusData::int(-(1i128 << 64) - 1)), "c349010000000000000000");
    }

    #[test]
    fn long_bytes_are_chunked() {
        let d = PlutusData::bytes(vec![0xaa; 65]);
        let enc = encode(&d);
        assert_eq!(enc[0], 0x5f);
        assert_eq!(enc[1], 0x58);
        assert_eq!(enc[2], 64);
        assert_eq!(*enc.last().unwrap(), 0xff);
        assert_eq!(decode(&enc).unwrap(), d);
    }

    #[test]
    fn exactly_64_bytes_stay_definite() {
        let enc = encode(&PlutusData::bytes(vec![1; 64]));
        assert_eq!(&enc[..2], &[0x58, 64]);
    }

    #[test]
    fn decodes_definite_arrays_too() {
        // Constr 0 [1, 2] with a definite-length field array.
        let d = decode(&hex::decode("d879820102").unwrap()).unwrap();
        assert_eq!(d, PlutusData::constr(0, vec![PlutusData::int(1), PlutusData::int(2)]));
    }

    #[test]
    fn map_roundtrip() {
        let d = PlutusData::Map(vec![(PlutusData::bytes(b"k".to_vec()), PlutusData::int(9))]);
        assert_eq!(hex_of(&d), "a1416b09");
        assert_eq!(decode(&encode(&d)).unwrap(), d);
    }

    #[test]
    fn trailing_bytes_rejected() {
        assert_eq!(decode(&[0x01, 0x02]), Err(PlutusError::TrailingBytes(1)));
    }

    #[test]
    fn truncated_input_rejected() {
        assert!(matches!(decode(&[0x9f, 0x01]), Err(PlutusError::UnexpectedEof(_))));
        assert!(matches!(decode(&[0x58, 0x05, 0x01]), Err(PlutusError::UnexpectedEof(_))));
    }

    #[test]
    fn unknown_tags_rejected() {
        assert_eq!(decode(&[0xd8, 0x1e, 0x00]), Err(PlutusError::UnsupportedTag(30)));
    }

    #[test]
    fn deep_nesting_rejected() {
        let mut bytes = vec![0x81; MAX_DEPTH + 2];
        bytes.push(0x00);
        assert_eq!(decode(&bytes), Err(PlutusError::TooDeep(MAX_DEPTH)));
    }
}
