/*!
The `ucsv` crate decodes CSV data stored as UTF-8, UTF-16 or UTF-32 into an
in memory [`Table`] of UTF-8 strings.

# Overview

A [`Parser`] reads an entire input (a file, a string, a byte buffer or any
`io::Read`) and produces a [`Table`]: a list of [`Row`]s that all have the
same number of fields as the first row. Parsing is configured with a
[`ParserBuilder`] or, equivalently, a [`ParseOptions`] value.

The dialect understood here is small:

* Fields are separated by a single byte delimiter (`,` by default) and
  records by a line feed. A carriage return is ordinary field content.
* A double quote toggles a quoted region anywhere in a field. Inside quotes
  the delimiter is literal, but a raw line feed is an error.
* Backslash escapes (`\"`, `\n` and `\\`) are recognized inside and outside
  of quotes, unless disabled.
* Spaces, tabs and NULs are trimmed from both ends of every field, unless
  disabled.
* Lines without any field data are skipped.

The input encoding is either given up front or detected from a byte order
mark with [`EncodingMode::DetectFromBom`].

# Errors

Parsing stops at the first error. Every error maps to a [`ParseOutcome`],
whose numeric code is stable. When a row has the wrong number of fields,
the rows accepted before it are kept in the error and can be recovered with
[`Error::into_table`].

# Example

```
use ucsv::{EncodingMode, ParserBuilder};

# fn main() { example().unwrap(); }
fn example() -> ucsv::Result<()> {
    // "name,city" followed by one record, as UTF-16LE with a BOM.
    let text = "name,city\n\"Doe, Jane\", Z\u{fc}rich \n";
    let mut data = vec![0xFF, 0xFE];
    for unit in text.encode_utf16() {
        data.extend_from_slice(&unit.to_le_bytes());
    }

    let parser = ParserBuilder::new()
        .encoding(EncodingMode::DetectFromBom)
        .build();
    let table = parser.parse_bytes(&data)?;
    assert_eq!(2, table.len());
    assert_eq!(2, table.column_count());
    assert_eq!(Some("Doe, Jane"), table.get(1, 0));
    assert_eq!(Some("Z\u{fc}rich"), table.get(1, 1));
    Ok(())
}
```

# Logging

Decoding emits [`tracing`](https://docs.rs/tracing) events: the chosen
encoding and every aborted parse at `DEBUG`, and every accepted row at
`TRACE`. No subscriber is installed by this crate.
*/

#![deny(missing_docs)]

use std::io;
use std::path::Path;

pub use ucsv_core::{Encoding, EncodingMode, SyntaxError};

pub use crate::error::{
    DecodeError, Error, ErrorKind, ParseOutcome, Position, Result,
};
pub use crate::field::FieldBuffer;
pub use crate::parser::{ParseOptions, Parser, ParserBuilder};
pub use crate::reader::UnitReader;
pub use crate::table::{Row, RowIter, Table};

mod error;
mod field;
mod parser;
mod reader;
mod table;

/// Parse the file at `path` with the given options.
///
/// This is a shortcut for `Parser::from_options(opts).parse_path(path)`.
pub fn parse_path<P: AsRef<Path>>(
    path: P,
    opts: &ParseOptions,
) -> Result<Table> {
    Parser::from_options(opts.clone()).parse_path(path)
}

/// Parse in memory text with the given options.
///
/// ```
/// let table = ucsv::parse_text("a,b\n1,2", &Default::default()).unwrap();
/// assert_eq!(Some("2"), table.get(1, 1));
/// ```
pub fn parse_text<S: AsRef<str>>(
    text: S,
    opts: &ParseOptions,
) -> Result<Table> {
    Parser::from_options(opts.clone()).parse_text(text)
}

/// Parse everything from `rdr` with the given options.
pub fn parse_reader<R: io::Read>(
    rdr: R,
    opts: &ParseOptions,
) -> Result<Table> {
    Parser::from_options(opts.clone()).parse_reader(rdr)
}
