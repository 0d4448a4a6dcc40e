use std::error;
use std::fmt;
use std::io;
use std::path::PathBuf;
use std::result;

use ucsv_core::{Encoding, SyntaxError};

use crate::table::Table;

/// A type alias for `Result<T, ucsv::Error>`.
pub type Result<T> = result::Result<T, Error>;

/// The coarse outcome of a parse.
///
/// Every error maps to exactly one outcome (see [`Error::outcome`]), and the
/// numeric value of an outcome is stable, which makes it suitable as a
/// process exit code.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ParseOutcome {
    /// The input was parsed completely.
    Success = 0,
    /// The input file could not be opened.
    FileNotFound = 1,
    /// A row did not have as many fields as the first row.
    ColumnCountMismatch = 2,
    /// Reserved for invalid parser options. Never produced today.
    ArgumentError = 3,
    /// The input was malformed or could not be decoded.
    ParseError = 4,
    /// Reserved for input that does not look like CSV. Never produced today.
    NoCsv = 5,
}

impl ParseOutcome {
    /// Determine the outcome of a parse result.
    pub fn of<T>(res: &Result<T>) -> ParseOutcome {
        match *res {
            Ok(_) => ParseOutcome::Success,
            Err(ref err) => err.outcome(),
        }
    }

    /// The numeric value of this outcome.
    pub fn code(&self) -> i32 {
        *self as i32
    }

    /// Returns true if and only if this is `ParseOutcome::Success`.
    pub fn is_success(&self) -> bool {
        *self == ParseOutcome::Success
    }
}

impl fmt::Display for ParseOutcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match *self {
            ParseOutcome::Success => "success",
            ParseOutcome::FileNotFound => "file not found",
            ParseOutcome::ColumnCountMismatch => "column count mismatch",
            ParseOutcome::ArgumentError => "argument error",
            ParseOutcome::ParseError => "parse error",
            ParseOutcome::NoCsv => "not CSV",
        };
        f.write_str(name)
    }
}

/// The location of the parser in its input when an error occurred.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Position {
    unit: u64,
    line: u64,
    row: u64,
}

impl Default for Position {
    fn default() -> Position {
        Position::new()
    }
}

impl Position {
    /// Returns a new position initialized to the start value.
    pub fn new() -> Position {
        Position { unit: 0, line: 1, row: 0 }
    }

    /// The number of code units consumed, including the one being
    /// processed. A byte order mark is not counted.
    pub fn unit(&self) -> u64 {
        self.unit
    }

    /// The line number, starting at `1`, counted by line feeds consumed.
    pub fn line(&self) -> u64 {
        self.line
    }

    /// The index of the row being assembled, which is the number of rows
    /// accepted so far.
    pub fn row(&self) -> u64 {
        self.row
    }

    /// Set the code unit offset.
    pub fn set_unit(&mut self, unit: u64) -> &mut Position {
        self.unit = unit;
        self
    }

    /// Set the line number.
    pub fn set_line(&mut self, line: u64) -> &mut Position {
        self.line = line;
        self
    }

    /// Set the row index.
    pub fn set_row(&mut self, row: u64) -> &mut Position {
        self.row = row;
        self
    }
}

/// An error that occurs while decoding a field into UTF-8 text.
///
/// Offsets are measured in code units of the field after trimming.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DecodeError {
    encoding: Encoding,
    valid_up_to: usize,
    unit: Option<u32>,
}

/// Create a new decode error.
pub(crate) fn new_decode_error(
    encoding: Encoding,
    valid_up_to: usize,
    unit: Option<u32>,
) -> DecodeError {
    DecodeError { encoding: encoding, valid_up_to: valid_up_to, unit: unit }
}

impl DecodeError {
    /// The encoding the field was being decoded from.
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// The number of leading code units that were valid.
    pub fn valid_up_to(&self) -> usize {
        self.valid_up_to
    }

    /// The first offending code unit, if the field did not simply end in
    /// the middle of a sequence.
    pub fn unit(&self) -> Option<u32> {
        self.unit
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.unit {
            None => write!(
                f,
                "invalid {}: incomplete sequence after {} code units",
                self.encoding, self.valid_up_to
            ),
            Some(unit) => write!(
                f,
                "invalid {}: invalid code unit 0x{:X} after {} code units",
                self.encoding, unit, self.valid_up_to
            ),
        }
    }
}

impl error::Error for DecodeError {}

/// An error that can occur when parsing CSV data.
///
/// Use [`Error::outcome`] to classify the error, and [`Error::into_table`]
/// to recover the rows accepted before a column count mismatch.
#[derive(Debug)]
pub struct Error(Box<ErrorKind>);

impl Error {
    /// A crate private constructor for `Error`.
    pub(crate) fn new(kind: ErrorKind) -> Error {
        Error(Box::new(kind))
    }

    /// Return the specific type of this error.
    pub fn kind(&self) -> &ErrorKind {
        &self.0
    }

    /// Unwrap this error into its underlying type.
    pub fn into_kind(self) -> ErrorKind {
        *self.0
    }

    /// The outcome this error corresponds to.
    pub fn outcome(&self) -> ParseOutcome {
        match *self.0 {
            ErrorKind::Open { .. } => ParseOutcome::FileNotFound,
            ErrorKind::UnequalLengths { .. } => {
                ParseOutcome::ColumnCountMismatch
            }
            ErrorKind::Io(_)
            | ErrorKind::Syntax { .. }
            | ErrorKind::Decode { .. }
            | ErrorKind::Truncated { .. } => ParseOutcome::ParseError,
        }
    }

    /// The position at which this error occurred, if available.
    pub fn position(&self) -> Option<&Position> {
        match *self.0 {
            ErrorKind::UnequalLengths { ref pos, .. }
            | ErrorKind::Syntax { ref pos, .. }
            | ErrorKind::Decode { ref pos, .. } => Some(pos),
            _ => None,
        }
    }

    /// Returns true if this is an I/O error, including a failure to open
    /// the input file.
    pub fn is_io_error(&self) -> bool {
        match *self.0 {
            ErrorKind::Io(_) | ErrorKind::Open { .. } => true,
            _ => false,
        }
    }

    /// Consume this error and return the rows that survived it.
    ///
    /// Only a column count mismatch preserves rows: every row accepted
    /// before the offending one. Every other error yields an empty table.
    pub fn into_table(self) -> Table {
        match *self.0 {
            ErrorKind::UnequalLengths { table, .. } => table,
            _ => Table::new(),
        }
    }
}

/// The specific type of an error.
#[derive(Debug)]
pub enum ErrorKind {
    /// The input file could not be opened.
    Open {
        /// The path that was given.
        path: PathBuf,
        /// The error reported when opening it.
        err: io::Error,
    },
    /// An I/O error that occurred while reading CSV data.
    Io(io::Error),
    /// A row had a different number of fields than the first row.
    UnequalLengths {
        /// The position of the offending row.
        pos: Position,
        /// The number of fields in the first row.
        expected_len: u64,
        /// The number of fields in the offending row.
        len: u64,
        /// The rows accepted before the offending row.
        table: Table,
    },
    /// The input was malformed.
    Syntax {
        /// Where the malformed construct was found.
        pos: Position,
        /// What was malformed.
        err: SyntaxError,
    },
    /// A field could not be decoded to UTF-8.
    Decode {
        /// The position of the end of the field.
        pos: Position,
        /// The index of the field in its row.
        field: u64,
        /// The decoding error.
        err: DecodeError,
    },
    /// The input ended partway through a multi-byte code unit.
    Truncated {
        /// The encoding of the input.
        encoding: Encoding,
        /// The number of bytes left over.
        trailing: usize,
    },
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        Error::new(ErrorKind::Io(err))
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self.0 {
            ErrorKind::Open { ref err, .. } => Some(err),
            ErrorKind::Io(ref err) => Some(err),
            ErrorKind::Decode { ref err, .. } => Some(err),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self.0 {
            ErrorKind::Open { ref path, ref err } => {
                write!(f, "could not open {}: {}", path.display(), err)
            }
            ErrorKind::Io(ref err) => err.fmt(f),
            ErrorKind::UnequalLengths { ref pos, expected_len, len, .. } => {
                write!(
                    f,
                    "CSV parse error: row {} (line {}, code unit {}): \
                     found row with {} fields, but the first row \
                     has {} fields",
                    pos.row(),
                    pos.line(),
                    pos.unit(),
                    len,
                    expected_len
                )
            }
            ErrorKind::Syntax { ref pos, ref err } => write!(
                f,
                "CSV parse error: row {} (line {}, code unit {}): {}",
                pos.row(),
                pos.line(),
                pos.unit(),
                err
            ),
            ErrorKind::Decode { ref pos, field, ref err } => write!(
                f,
                "CSV parse error: row {} (line {}, code unit {}, \
                 field: {}): {}",
                pos.row(),
                pos.line(),
                pos.unit(),
                field,
                err
            ),
            ErrorKind::Truncated { encoding, trailing } => write!(
                f,
                "CSV parse error: input ends with {} stray byte(s), \
                 which is not a whole {} code unit",
                trailing, encoding
            ),
        }
    }
}
