use std::io;

use tracing::debug;
use ucsv_core::{decode_unit, detect_bom, Encoding, EncodingMode, MAX_BOM_LEN};

use crate::error::{Error, ErrorKind, Result};

const BUF_SIZE: usize = 4096;

/// A buffered reader of fixed width code units.
///
/// Bytes are pulled from the underlying reader into a fixed size buffer
/// that is reused for every refill, and handed out one code unit at a time.
/// A code unit may straddle two refills.
///
/// End of input is reported as `None`, so a NUL code unit is ordinary
/// content.
#[derive(Debug)]
pub struct UnitReader<R> {
    rdr: R,
    buf: Vec<u8>,
    pos: usize,
    len: usize,
    encoding: Encoding,
    eof: bool,
    units: u64,
}

impl<R: io::Read> UnitReader<R> {
    /// Create a reader for the given encoding mode.
    ///
    /// A concrete encoding is used as is and nothing is read yet. With
    /// `EncodingMode::DetectFromBom`, up to four bytes are read and matched
    /// against the known byte order marks; the matched mark is skipped and
    /// any other bytes read stay available as content. Input without a
    /// recognized mark is decoded as UTF-8.
    pub fn new(rdr: R, mode: EncodingMode) -> Result<UnitReader<R>> {
        if let Some(enc) = mode.concrete() {
            return Ok(UnitReader::with_encoding(rdr, enc));
        }
        let mut urdr = UnitReader::with_encoding(rdr, Encoding::Utf8);
        urdr.fill(MAX_BOM_LEN)?;
        match detect_bom(&urdr.buf[..urdr.len]) {
            Some((enc, bom_len)) => {
                debug!(
                    encoding = enc.name(),
                    bom_len = bom_len,
                    "detected encoding from byte order mark"
                );
                urdr.encoding = enc;
                urdr.pos = bom_len;
            }
            None => {
                debug!(
                    peeked = urdr.len,
                    "no byte order mark found, decoding as UTF-8"
                );
            }
        }
        Ok(urdr)
    }

    /// Create a reader for a known encoding.
    pub fn with_encoding(rdr: R, encoding: Encoding) -> UnitReader<R> {
        UnitReader {
            rdr: rdr,
            buf: vec![0; BUF_SIZE],
            pos: 0,
            len: 0,
            encoding: encoding,
            eof: false,
            units: 0,
        }
    }

    /// The encoding code units are decoded from.
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Returns true once the underlying reader has reported end of input.
    ///
    /// Buffered code units may still be available at that point.
    pub fn is_eof(&self) -> bool {
        self.eof
    }

    /// The number of code units returned so far.
    pub fn units(&self) -> u64 {
        self.units
    }

    /// Read the next code unit, or `None` at the end of input.
    ///
    /// Input that ends partway through a code unit is an error.
    pub fn read_unit(&mut self) -> Result<Option<u32>> {
        let width = self.encoding.width();
        if self.len - self.pos < width {
            self.fill(width)?;
            let avail = self.len - self.pos;
            if avail == 0 {
                return Ok(None);
            }
            if avail < width {
                return Err(Error::new(ErrorKind::Truncated {
                    encoding: self.encoding,
                    trailing: avail,
                }));
            }
        }
        let unit =
            decode_unit(&self.buf[self.pos..self.pos + width], self.encoding);
        self.pos += width;
        self.units += 1;
        Ok(Some(unit))
    }

    /// Refill the buffer until at least `want` bytes are available or the
    /// underlying reader is exhausted. Unconsumed bytes are moved to the
    /// front of the buffer first.
    fn fill(&mut self, want: usize) -> io::Result<()> {
        if self.pos > 0 {
            self.buf.copy_within(self.pos..self.len, 0);
            self.len -= self.pos;
            self.pos = 0;
        }
        while !self.eof && self.len < want {
            match self.rdr.read(&mut self.buf[self.len..]) {
                Ok(0) => self.eof = true,
                Ok(n) => self.len += n,
                Err(ref err) if err.kind() == io::ErrorKind::Interrupted => {}
                Err(err) => return Err(err),
            }
        }
        Ok(())
    }
}
