use core::fmt;

/// A concrete encoding that code units can be decoded from.
///
/// UTF-8 is handled one byte at a time: multi-byte sequences pass through as
/// consecutive code units and are only validated once a field is complete.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Encoding {
    /// UTF-8, one byte per code unit.
    Utf8,
    /// UTF-16, big-endian.
    Utf16Be,
    /// UTF-16, little-endian.
    Utf16Le,
    /// UTF-32, big-endian.
    Utf32Be,
    /// UTF-32, little-endian.
    Utf32Le,
}

impl Encoding {
    /// The number of bytes in a single code unit.
    pub fn width(&self) -> usize {
        match *self {
            Encoding::Utf8 => 1,
            Encoding::Utf16Be | Encoding::Utf16Le => 2,
            Encoding::Utf32Be | Encoding::Utf32Le => 4,
        }
    }

    /// Returns true if code units are stored most significant byte first.
    ///
    /// UTF-8 has no byte order and always returns false.
    pub fn is_big_endian(&self) -> bool {
        match *self {
            Encoding::Utf16Be | Encoding::Utf32Be => true,
            _ => false,
        }
    }

    /// The conventional label for this encoding, e.g., `UTF-16LE`.
    pub fn name(&self) -> &'static str {
        match *self {
            Encoding::Utf8 => "UTF-8",
            Encoding::Utf16Be => "UTF-16BE",
            Encoding::Utf16Le => "UTF-16LE",
            Encoding::Utf32Be => "UTF-32BE",
            Encoding::Utf32Le => "UTF-32LE",
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The encoding a parser is configured with.
///
/// This is either one of the concrete encodings or a request to inspect the
/// first bytes of the input for a byte order mark.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum EncodingMode {
    /// UTF-8.
    Utf8,
    /// UTF-16, big-endian.
    Utf16Be,
    /// UTF-16, little-endian.
    Utf16Le,
    /// UTF-32, big-endian.
    Utf32Be,
    /// UTF-32, little-endian.
    Utf32Le,
    /// Resolve the encoding from a leading byte order mark.
    DetectFromBom,
}

impl EncodingMode {
    /// Returns the concrete encoding, or `None` for `DetectFromBom`.
    pub fn concrete(&self) -> Option<Encoding> {
        match *self {
            EncodingMode::Utf8 => Some(Encoding::Utf8),
            EncodingMode::Utf16Be => Some(Encoding::Utf16Be),
            EncodingMode::Utf16Le => Some(Encoding::Utf16Le),
            EncodingMode::Utf32Be => Some(Encoding::Utf32Be),
            EncodingMode::Utf32Le => Some(Encoding::Utf32Le),
            EncodingMode::DetectFromBom => None,
        }
    }
}

impl Default for EncodingMode {
    fn default() -> EncodingMode {
        EncodingMode::Utf8
    }
}

impl From<Encoding> for EncodingMode {
    fn from(enc: Encoding) -> EncodingMode {
        match enc {
            Encoding::Utf8 => EncodingMode::Utf8,
            Encoding::Utf16Be => EncodingMode::Utf16Be,
            Encoding::Utf16Le => EncodingMode::Utf16Le,
            Encoding::Utf32Be => EncodingMode::Utf32Be,
            Encoding::Utf32Le => EncodingMode::Utf32Le,
        }
    }
}

/// The length of the longest byte order mark in `BOMS`.
pub const MAX_BOM_LEN: usize = 4;

/// Known byte order marks, in the order they are tested.
///
/// The UTF-16LE mark is a prefix of the UTF-32LE mark and is tested first,
/// so UTF-32LE input is never detected from its mark.
pub const BOMS: &[(Encoding, &[u8])] = &[
    (Encoding::Utf8, &[0xEF, 0xBB, 0xBF]),
    (Encoding::Utf16Be, &[0xFE, 0xFF]),
    (Encoding::Utf16Le, &[0xFF, 0xFE]),
    (Encoding::Utf32Be, &[0x00, 0x00, 0xFE, 0xFF]),
    (Encoding::Utf32Le, &[0xFF, 0xFE, 0x00, 0x00]),
];

/// Match the start of `prefix` against the known byte order marks.
///
/// On success, this returns the detected encoding along with the length of
/// the mark, which callers should skip before decoding. `prefix` usually
/// holds the first `MAX_BOM_LEN` bytes of a stream, but may be shorter.
pub fn detect_bom(prefix: &[u8]) -> Option<(Encoding, usize)> {
    BOMS.iter()
        .find(|&&(_, bom)| prefix.starts_with(bom))
        .map(|&(enc, bom)| (enc, bom.len()))
}

/// Decode a single code unit from the start of `bytes`.
///
/// Big-endian units are converted to host order. UTF-8 code units are the
/// raw byte value.
///
/// # Panics
///
/// This panics if `bytes` is shorter than `enc.width()`.
#[inline]
pub fn decode_unit(bytes: &[u8], enc: Encoding) -> u32 {
    match enc {
        Encoding::Utf8 => bytes[0] as u32,
        Encoding::Utf16Be => u16::from_be_bytes([bytes[0], bytes[1]]) as u32,
        Encoding::Utf16Le => u16::from_le_bytes([bytes[0], bytes[1]]) as u32,
        Encoding::Utf32Be => {
            u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
        }
        Encoding::Utf32Le => {
            u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
        }
    }
}

/// Every encoding supported here represents ASCII as a single code unit with
/// the same value, so this is where that assumption lives.
#[inline]
fn ascii(byte: u8, _enc: Encoding) -> u32 {
    debug_assert!(byte.is_ascii());
    byte as u32
}

/// The code unit of `"` in `enc`.
#[inline]
pub fn quote(enc: Encoding) -> u32 {
    ascii(b'"', enc)
}

/// The code unit of `\` in `enc`.
#[inline]
pub fn backslash(enc: Encoding) -> u32 {
    ascii(b'\\', enc)
}

/// The code unit of a line feed in `enc`.
#[inline]
pub fn newline(enc: Encoding) -> u32 {
    ascii(b'\n', enc)
}

/// The code unit of `n` in `enc`, which follows a backslash to spell a line
/// feed.
#[inline]
pub fn letter_n(enc: Encoding) -> u32 {
    ascii(b'n', enc)
}
