use std::char;

use bstr::ByteSlice;
use ucsv_core::Encoding;

use crate::error::{new_decode_error, DecodeError};

const INITIAL_CAPACITY: usize = 256;

/// Code units stored at the width of the active encoding.
#[derive(Clone, Debug)]
enum Units {
    U8(Vec<u8>),
    U16(Vec<u16>),
    U32(Vec<u32>),
}

/// Accumulates the code units of the field currently being parsed.
///
/// Units are kept in host order at their native width and only converted to
/// UTF-8 when the field is complete.
#[derive(Clone, Debug)]
pub struct FieldBuffer {
    encoding: Encoding,
    units: Units,
}

impl FieldBuffer {
    /// Create an empty buffer for the given encoding.
    pub fn new(encoding: Encoding) -> FieldBuffer {
        let units = match encoding.width() {
            1 => Units::U8(Vec::with_capacity(INITIAL_CAPACITY)),
            2 => Units::U16(Vec::with_capacity(INITIAL_CAPACITY)),
            _ => Units::U32(Vec::with_capacity(INITIAL_CAPACITY)),
        };
        FieldBuffer { encoding: encoding, units: units }
    }

    /// The encoding of the buffered units.
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Append a code unit.
    ///
    /// Units wider than the encoding are truncated to its width; code units
    /// from a reader of the same encoding always fit.
    #[inline]
    pub fn push(&mut self, unit: u32) {
        match self.units {
            Units::U8(ref mut units) => units.push(unit as u8),
            Units::U16(ref mut units) => units.push(unit as u16),
            Units::U32(ref mut units) => units.push(unit),
        }
    }

    /// Remove all buffered units, keeping the allocation.
    pub fn clear(&mut self) {
        match self.units {
            Units::U8(ref mut units) => units.clear(),
            Units::U16(ref mut units) => units.clear(),
            Units::U32(ref mut units) => units.clear(),
        }
    }

    /// The number of buffered code units.
    pub fn len(&self) -> usize {
        match self.units {
            Units::U8(ref units) => units.len(),
            Units::U16(ref units) => units.len(),
            Units::U32(ref units) => units.len(),
        }
    }

    /// Returns true if no code units are buffered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Convert the buffered units into a UTF-8 string.
    ///
    /// When `trim` is set, leading and trailing spaces, tabs and NULs are
    /// dropped first. Other whitespace is kept. The buffer is left
    /// untouched.
    pub fn materialize(&self, trim: bool) -> Result<String, DecodeError> {
        match self.units {
            Units::U8(ref units) => {
                let bytes = if trim {
                    units.trim_with(|ch| is_blank(ch as u32))
                } else {
                    &units[..]
                };
                match bytes.to_str() {
                    Ok(s) => Ok(s.to_string()),
                    Err(err) => Err(new_decode_error(
                        self.encoding,
                        err.valid_up_to(),
                        err.error_len()
                            .map(|_| bytes[err.valid_up_to()] as u32),
                    )),
                }
            }
            Units::U16(ref units) => {
                let units = if trim { trimmed(units) } else { &units[..] };
                let mut s = String::with_capacity(units.len());
                let mut valid = 0;
                for ch in char::decode_utf16(units.iter().cloned()) {
                    match ch {
                        Ok(ch) => {
                            valid += ch.len_utf16();
                            s.push(ch);
                        }
                        Err(err) => {
                            return Err(new_decode_error(
                                self.encoding,
                                valid,
                                Some(err.unpaired_surrogate() as u32),
                            ));
                        }
                    }
                }
                Ok(s)
            }
            Units::U32(ref units) => {
                let units = if trim { trimmed(units) } else { &units[..] };
                let mut s = String::with_capacity(units.len());
                for (i, &unit) in units.iter().enumerate() {
                    match char::from_u32(unit) {
                        Some(ch) => s.push(ch),
                        None => {
                            return Err(new_decode_error(
                                self.encoding,
                                i,
                                Some(unit),
                            ));
                        }
                    }
                }
                Ok(s)
            }
        }
    }
}

/// Returns true for the units stripped by trimming: space, tab and NUL.
#[inline]
fn is_blank(unit: u32) -> bool {
    unit == ' ' as u32 || unit == '\t' as u32 || unit == 0
}

fn trimmed<T: Copy + Into<u32>>(units: &[T]) -> &[T] {
    let start = match units.iter().position(|&u| !is_blank(u.into())) {
        None => return &[],
        Some(start) => start,
    };
    let end = units
        .iter()
        .rposition(|&u| !is_blank(u.into()))
        .map_or(start, |i| i + 1);
    &units[start..end]
}

#[cfg(test)]
mod tests {
    use ucsv_core::Encoding;

    use super::FieldBuffer;

    fn utf8(s: &[u8]) -> FieldBuffer {
        let mut buf = FieldBuffer::new(Encoding::Utf8);
        for &b in s {
            buf.push(b as u32);
        }
        buf
    }

    fn utf16(s: &str) -> FieldBuffer {
        let mut buf = FieldBuffer::new(Encoding::Utf16Le);
        for u in s.encode_utf16() {
            buf.push(u as u32);
        }
        buf
    }

    fn utf32(s: &str) -> FieldBuffer {
        let mut buf = FieldBuffer::new(Encoding::Utf32Be);
        for ch in s.chars() {
            buf.push(ch as u32);
        }
        buf
    }

    #[test]
    fn empty() {
        let mut buf = FieldBuffer::new(Encoding::Utf16Be);
        assert!(buf.is_empty());
        assert_eq!("", buf.materialize(true).unwrap());
        buf.push('a' as u32);
        assert!(!buf.is_empty());
        assert_eq!(1, buf.len());
        buf.clear();
        assert!(buf.is_empty());
        assert_eq!("", buf.materialize(false).unwrap());
    }

    #[test]
    fn utf8_passthrough() {
        let buf = utf8("  h\u{e9}llo \u{1F600}\t".as_bytes());
        assert_eq!("h\u{e9}llo \u{1F600}", buf.materialize(true).unwrap());
        assert_eq!(
            "  h\u{e9}llo \u{1F600}\t",
            buf.materialize(false).unwrap()
        );
    }

    #[test]
    fn trims_only_space_tab_nul() {
        let buf = utf8(b"\x00\t a\r\n\x00 ");
        assert_eq!("a\r\n", buf.materialize(true).unwrap());
        let buf = utf16("\u{a0}a\u{3000}");
        assert_eq!("\u{a0}a\u{3000}", buf.materialize(true).unwrap());
    }

    #[test]
    fn trims_blank_field_to_empty() {
        assert_eq!("", utf8(b" ").materialize(true).unwrap());
        assert_eq!("", utf8(b" \t\x00 ").materialize(true).unwrap());
        assert_eq!("", utf16("  ").materialize(true).unwrap());
        assert_eq!("", utf32("\t").materialize(true).unwrap());
        assert_eq!(" ", utf32(" ").materialize(false).unwrap());
    }

    #[test]
    fn utf16_pairs() {
        let buf = utf16(" caf\u{e9} \u{1F600} ");
        assert_eq!("caf\u{e9} \u{1F600}", buf.materialize(true).unwrap());
    }

    #[test]
    fn utf32_chars() {
        let buf = utf32("\u{10FFFF}x ");
        assert_eq!("\u{10FFFF}x", buf.materialize(true).unwrap());
        assert_eq!("\u{10FFFF}x ", buf.materialize(false).unwrap());
    }

    #[test]
    fn invalid_utf8() {
        let err = utf8(b"ab\xFFc").materialize(false).unwrap_err();
        assert_eq!(Encoding::Utf8, err.encoding());
        assert_eq!(2, err.valid_up_to());
        assert_eq!(Some(0xFF), err.unit());

        let err = utf8(b"a\xC3").materialize(false).unwrap_err();
        assert_eq!(1, err.valid_up_to());
        assert_eq!(None, err.unit());
    }

    #[test]
    fn unpaired_surrogate() {
        let mut buf = utf16("\u{1F600}a");
        buf.push(0xDC00);
        let err = buf.materialize(false).unwrap_err();
        assert_eq!(Encoding::Utf16Le, err.encoding());
        assert_eq!(3, err.valid_up_to());
        assert_eq!(Some(0xDC00), err.unit());
    }

    #[test]
    fn invalid_scalar() {
        let mut buf = utf32("ab");
        buf.push(0x110000);
        let err = buf.materialize(true).unwrap_err();
        assert_eq!(2, err.valid_up_to());
        assert_eq!(Some(0x110000), err.unit());

        let mut buf = utf32("");
        buf.push(0xD800);
        assert_eq!(Some(0xD800), buf.materialize(true).unwrap_err().unit());
    }
}
