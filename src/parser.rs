use std::fs;
use std::io;
use std::mem;
use std::path::Path;

use tracing::{debug, trace};
use ucsv_core::{newline, Action, EncodingMode, Escape, Machine, SyntaxError};

use crate::error::{Error, ErrorKind, Position, Result};
use crate::field::FieldBuffer;
use crate::reader::UnitReader;
use crate::table::{Row, Table};

/// The knobs that control how CSV data is decoded.
///
/// Every field is public and independently settable. [`ParserBuilder`]
/// offers the same settings as chained setters.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ParseOptions {
    /// The byte that separates fields outside of quotes. The default is
    /// `b','`.
    pub delimiter: u8,
    /// Strip spaces, tabs and NULs from both ends of every field. Enabled
    /// by default.
    pub trim: bool,
    /// The encoding of the input, or BOM detection. The default is UTF-8.
    pub encoding: EncodingMode,
    /// Recognize `\"`, `\n` and `\\` escapes. Enabled by default.
    pub backslash_escape: bool,
    /// Treat any other escape as an error rather than a literal backslash.
    /// Enabled by default.
    pub backslash_escape_strict: bool,
}

impl Default for ParseOptions {
    fn default() -> ParseOptions {
        ParseOptions {
            delimiter: b',',
            trim: true,
            encoding: EncodingMode::Utf8,
            backslash_escape: true,
            backslash_escape_strict: true,
        }
    }
}

impl ParseOptions {
    fn escape(&self) -> Escape {
        Escape::new(self.backslash_escape, self.backslash_escape_strict)
    }
}

/// Builds a CSV parser with various configuration knobs.
///
/// Once a `Parser` is built, its configuration cannot be changed.
#[derive(Debug, Default)]
pub struct ParserBuilder {
    opts: ParseOptions,
}

impl ParserBuilder {
    /// Create a new builder with default options.
    pub fn new() -> ParserBuilder {
        ParserBuilder::default()
    }

    /// Build a CSV parser from this configuration.
    pub fn build(&self) -> Parser {
        Parser::from_options(self.opts.clone())
    }

    /// The field delimiter to use when parsing CSV.
    ///
    /// The default is `b','`.
    pub fn delimiter(&mut self, delimiter: u8) -> &mut ParserBuilder {
        self.opts.delimiter = delimiter;
        self
    }

    /// Whether to strip ASCII spaces, tabs and NULs at both ends of each
    /// field.
    ///
    /// This is enabled by default.
    pub fn trim(&mut self, yes: bool) -> &mut ParserBuilder {
        self.opts.trim = yes;
        self
    }

    /// The encoding of the input.
    ///
    /// The default is `EncodingMode::Utf8`. Use
    /// `EncodingMode::DetectFromBom` to pick the encoding from a leading
    /// byte order mark, falling back to UTF-8 when there is none.
    pub fn encoding(&mut self, mode: EncodingMode) -> &mut ParserBuilder {
        self.opts.encoding = mode;
        self
    }

    /// Enable backslash escapes.
    ///
    /// When enabled, `\"` yields a literal quote, `\n` a line feed and `\\`
    /// a backslash, inside or outside of quotes. This is enabled by default.
    pub fn backslash_escape(&mut self, yes: bool) -> &mut ParserBuilder {
        self.opts.backslash_escape = yes;
        self
    }

    /// Reject unrecognized backslash escapes.
    ///
    /// When disabled, a backslash followed by anything other than `"`, `n`
    /// or `\` is kept as is and the following unit is parsed normally. This
    /// is enabled by default and has no effect unless backslash escapes are
    /// enabled.
    pub fn backslash_escape_strict(
        &mut self,
        yes: bool,
    ) -> &mut ParserBuilder {
        self.opts.backslash_escape_strict = yes;
        self
    }
}

/// A CSV parser that decodes an entire input into a [`Table`].
///
/// A parser holds only its configuration, so one parser may be used for
/// any number of inputs, including from several threads at once.
///
/// # Example
///
/// ```
/// use ucsv::{ParseOutcome, ParserBuilder};
///
/// let parser = ParserBuilder::new().delimiter(b';').build();
/// let table = parser.parse_text("a;b\n1;2\n").unwrap();
/// assert_eq!(2, table.len());
/// assert_eq!(Some("2"), table.get(1, 1));
///
/// let err = parser.parse_text("a;b\n1;2;3\n").unwrap_err();
/// assert_eq!(ParseOutcome::ColumnCountMismatch, err.outcome());
/// assert_eq!(1, err.into_table().len());
/// ```
#[derive(Clone, Debug, Default)]
pub struct Parser {
    opts: ParseOptions,
}

impl Parser {
    /// Create a new parser with default options.
    pub fn new() -> Parser {
        Parser::default()
    }

    /// Create a parser with the given options.
    pub fn from_options(opts: ParseOptions) -> Parser {
        Parser { opts: opts }
    }

    /// The options this parser was built with.
    pub fn options(&self) -> &ParseOptions {
        &self.opts
    }

    /// Parse the file at the given path.
    ///
    /// If the file cannot be opened, an error with the
    /// `ParseOutcome::FileNotFound` outcome is returned before anything is
    /// decoded.
    pub fn parse_path<P: AsRef<Path>>(&self, path: P) -> Result<Table> {
        let path = path.as_ref();
        let file = fs::File::open(path).map_err(|err| {
            Error::new(ErrorKind::Open { path: path.to_path_buf(), err: err })
        })?;
        self.parse_reader(file)
    }

    /// Parse in memory text.
    ///
    /// The text is treated as raw bytes, so the configured encoding still
    /// applies.
    pub fn parse_text<S: AsRef<str>>(&self, text: S) -> Result<Table> {
        self.parse_bytes(text.as_ref().as_bytes())
    }

    /// Parse an in memory buffer of bytes.
    pub fn parse_bytes<B: AsRef<[u8]>>(&self, bytes: B) -> Result<Table> {
        self.parse_reader(io::Cursor::new(bytes.as_ref()))
    }

    /// Parse everything from an arbitrary `io::Read`.
    ///
    /// The reader is buffered for you automatically.
    ///
    /// # Errors
    ///
    /// Parsing stops at the first problem. A row whose field count differs
    /// from the first row's yields an error from which the rows accepted
    /// before it can be recovered with `Error::into_table`. Malformed input
    /// (a line feed inside quotes, an unclosed quote, an unrecognized escape
    /// in strict mode), undecodable fields and I/O errors discard every row.
    pub fn parse_reader<R: io::Read>(&self, rdr: R) -> Result<Table> {
        let mut units = UnitReader::new(rdr, self.opts.encoding)?;
        let enc = units.encoding();
        debug!(
            configured = ?self.opts.encoding,
            encoding = enc.name(),
            "decoding CSV input"
        );

        let mut machine =
            Machine::new(enc, self.opts.delimiter, self.opts.escape());
        let mut asm = Assembler::new(FieldBuffer::new(enc), self.opts.trim);
        let lf = newline(enc);
        loop {
            let unit = units.read_unit()?;
            asm.pos.set_unit(units.units());
            let step = match unit {
                Some(unit) => machine.step(unit),
                None => machine.finish(asm.is_pending()),
            };
            if let Some(prefix) = step.prefix {
                asm.field.push(prefix);
            }
            match step.action {
                Action::Skip | Action::ArmEscape => {}
                Action::Keep => {
                    if let Some(unit) = unit {
                        asm.field.push(unit);
                    }
                }
                Action::Literal(lit) => asm.field.push(lit),
                Action::EndField => asm.end_field()?,
                Action::EndRecord => asm.end_record()?,
                Action::Fail(err) => return Err(asm.syntax_error(err)),
            }
            match unit {
                None => break,
                Some(unit) if unit == lf => {
                    let line = asm.pos.line();
                    asm.pos.set_line(line + 1);
                }
                Some(_) => {}
            }
        }
        debug!(rows = asm.table.len(), "finished decoding CSV input");
        Ok(asm.table)
    }
}

/// Collects fields into rows and rows into a table.
struct Assembler {
    field: FieldBuffer,
    trim: bool,
    row: Vec<String>,
    table: Table,
    pos: Position,
}

impl Assembler {
    fn new(field: FieldBuffer, trim: bool) -> Assembler {
        Assembler {
            field: field,
            trim: trim,
            row: vec![],
            table: Table::new(),
            pos: Position::new(),
        }
    }

    fn end_field(&mut self) -> Result<()> {
        let s = match self.field.materialize(self.trim) {
            Ok(s) => s,
            Err(err) => {
                debug!(error = %err, "aborting: undecodable field");
                return Err(Error::new(ErrorKind::Decode {
                    pos: self.pos.clone(),
                    field: self.row.len() as u64,
                    err: err,
                }));
            }
        };
        self.row.push(s);
        self.field.clear();
        Ok(())
    }

    /// Returns true if any field data has been seen since the last row.
    fn is_pending(&self) -> bool {
        !self.row.is_empty() || !self.field.is_empty()
    }

    /// Completes the current row. Nothing happens when no field data has
    /// been seen since the last row, which is how blank lines are skipped.
    fn end_record(&mut self) -> Result<()> {
        if !self.is_pending() {
            return Ok(());
        }
        self.end_field()?;
        let row = Row::from(mem::replace(&mut self.row, vec![]));
        let expected_len = self.table.column_count();
        if !self.table.is_empty() && row.len() != expected_len {
            debug!(
                row = self.pos.row(),
                expected = expected_len,
                found = row.len(),
                "aborting: column count mismatch"
            );
            return Err(Error::new(ErrorKind::UnequalLengths {
                pos: self.pos.clone(),
                expected_len: expected_len as u64,
                len: row.len() as u64,
                table: mem::replace(&mut self.table, Table::new()),
            }));
        }
        trace!(row = self.pos.row(), fields = row.len(), "row complete");
        self.table.push(row);
        let next = self.pos.row() + 1;
        self.pos.set_row(next);
        Ok(())
    }

    fn syntax_error(&self, err: SyntaxError) -> Error {
        debug!(error = %err, "aborting: malformed CSV");
        Error::new(ErrorKind::Syntax { pos: self.pos.clone(), err: err })
    }
}
