use core::char;
use core::fmt;

use crate::encoding::{backslash, letter_n, newline, quote, Encoding};

/// The quoting state of the parser.
///
/// Whether a backslash escape is pending is tracked separately by
/// [`Machine`], since an escape can be armed in either state.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum State {
    /// Outside of a quoted region.
    Default,
    /// Inside a quoted region, where delimiters are literal and a raw line
    /// feed is an error.
    InQuotedField,
}

/// The structural class of a single code unit.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Class {
    /// The configured delimiter, seen outside of a quoted region.
    Delimiter,
    /// `"`
    Quote,
    /// `\`
    Backslash,
    /// A line feed.
    Newline,
    /// Field content.
    Other,
}

/// The backslash escape convention in effect.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Escape {
    /// Backslashes are ordinary field content.
    Disabled,
    /// `\"`, `\n` and `\\` are recognized. Any other escaped unit keeps its
    /// backslash and is then processed normally.
    Lenient,
    /// `\"`, `\n` and `\\` are recognized. Any other escaped unit is an error.
    Strict,
}

impl Escape {
    /// Build an escape convention from a pair of flags.
    ///
    /// `strict` has no effect when `enabled` is false.
    pub fn new(enabled: bool, strict: bool) -> Escape {
        match (enabled, strict) {
            (false, _) => Escape::Disabled,
            (true, false) => Escape::Lenient,
            (true, true) => Escape::Strict,
        }
    }

    /// Returns true if backslashes start an escape sequence.
    pub fn is_enabled(&self) -> bool {
        *self != Escape::Disabled
    }
}

impl Default for Escape {
    fn default() -> Escape {
        Escape::Strict
    }
}

/// What a caller must do with the code unit just fed to the machine.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Action {
    /// Drop the unit. Used for opening and closing quotes.
    Skip,
    /// Append the unit to the current field.
    Keep,
    /// Append the given unit to the current field instead of the one fed.
    Literal(u32),
    /// Drop the unit; an escape sequence has started.
    ArmEscape,
    /// The current field is complete.
    EndField,
    /// The current field and record are complete. Callers are expected to
    /// ignore this when no field data has been seen since the last record.
    EndRecord,
    /// The input is malformed and parsing must stop.
    Fail(SyntaxError),
}

/// The outcome of resolving a pending backslash escape.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Resolution {
    /// The escape was recognized. The unit is consumed and the given literal
    /// is appended instead.
    Resolved(u32),
    /// The escape was not recognized. The given literal (a backslash) is
    /// appended and the unit is then classified as usual.
    Passthrough(u32),
    /// The escape was not recognized and that is an error.
    Invalid(SyntaxError),
}

/// A malformed construct in CSV input.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SyntaxError {
    /// A raw line feed appeared inside a quoted region.
    NewlineInQuote,
    /// A quoted region was still open at the end of input.
    UnterminatedQuote,
    /// A backslash was followed by a unit other than `"`, `n` or `\`.
    InvalidEscape(u32),
    /// The input ended right after a backslash.
    DanglingEscape,
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            SyntaxError::NewlineInQuote => {
                write!(f, "line feed inside a quoted field")
            }
            SyntaxError::UnterminatedQuote => {
                write!(f, "quoted field is not closed before end of input")
            }
            SyntaxError::InvalidEscape(unit) => match char::from_u32(unit) {
                Some(ch) if !ch.is_control() => {
                    write!(f, "unrecognized escape sequence '\\{}'", ch)
                }
                _ => write!(
                    f,
                    "unrecognized escape sequence: backslash \
                     followed by U+{:04X}",
                    unit
                ),
            },
            SyntaxError::DanglingEscape => {
                write!(f, "input ends with an unfinished escape sequence")
            }
        }
    }
}

/// Resolve the unit that follows a backslash.
pub fn resolve_escape(unit: u32, enc: Encoding, escape: Escape) -> Resolution {
    if unit == quote(enc) {
        Resolution::Resolved(quote(enc))
    } else if unit == letter_n(enc) {
        Resolution::Resolved(newline(enc))
    } else if unit == backslash(enc) {
        Resolution::Resolved(backslash(enc))
    } else if escape == Escape::Strict {
        Resolution::Invalid(SyntaxError::InvalidEscape(unit))
    } else {
        Resolution::Passthrough(backslash(enc))
    }
}

/// The transition function of the parser.
///
/// `prev_quote` reports whether the previously classified unit was a quote,
/// which is what distinguishes a closing quote from a literal one inside a
/// quoted region. Note that this makes `"ab""cd"` close and immediately
/// reopen the quoted region, yielding `abcd` rather than the `ab"cd` most
/// CSV dialects would produce, while `""` inside a quoted region directly
/// after the opening quote yields a literal quote.
pub fn dispatch(
    state: State,
    class: Class,
    prev_quote: bool,
    escape: Escape,
) -> (Action, State) {
    use self::Class::*;
    use self::State::*;

    match (state, class) {
        (Default, Delimiter) => (Action::EndField, Default),
        (Default, Quote) => (Action::Skip, InQuotedField),
        (InQuotedField, Quote) if prev_quote => (Action::Keep, InQuotedField),
        (InQuotedField, Quote) => (Action::Skip, Default),
        (state, Backslash) if escape.is_enabled() => {
            (Action::ArmEscape, state)
        }
        (Default, Newline) => (Action::EndRecord, Default),
        (InQuotedField, Newline) => {
            (Action::Fail(SyntaxError::NewlineInQuote), InQuotedField)
        }
        (state, _) => (Action::Keep, state),
    }
}

/// The result of feeding one code unit (or the end of input) to a
/// [`Machine`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Step {
    /// A unit to append to the current field before carrying out `action`.
    ///
    /// This is only set when an unrecognized escape is passed through.
    pub prefix: Option<u32>,
    /// What to do with the unit.
    pub action: Action,
}

impl Step {
    fn new(action: Action) -> Step {
        Step { prefix: None, action: action }
    }
}

/// A push based state machine that classifies CSV code units.
///
/// The machine only tracks quoting and escape state. Accumulating fields
/// and records, as well as checking their shape, is up to the caller.
#[derive(Clone, Debug)]
pub struct Machine {
    enc: Encoding,
    delimiter: u32,
    escape: Escape,
    state: State,
    escape_pending: bool,
    prev_quote: bool,
}

impl Machine {
    /// Create a machine for input in the given encoding.
    ///
    /// The delimiter is compared against whole code units, so any ASCII
    /// byte works in every encoding.
    pub fn new(enc: Encoding, delimiter: u8, escape: Escape) -> Machine {
        Machine {
            enc: enc,
            delimiter: delimiter as u32,
            escape: escape,
            state: State::Default,
            escape_pending: false,
            prev_quote: false,
        }
    }

    /// The encoding this machine was created for.
    pub fn encoding(&self) -> Encoding {
        self.enc
    }

    /// The current quoting state.
    pub fn state(&self) -> State {
        self.state
    }

    /// Returns true if the last unit fed was an unresolved backslash.
    pub fn is_escape_pending(&self) -> bool {
        self.escape_pending
    }

    /// Reset the machine such that it behaves as if it had never been used.
    pub fn reset(&mut self) {
        self.state = State::Default;
        self.escape_pending = false;
        self.prev_quote = false;
    }

    /// Classify a unit under the current state.
    ///
    /// The delimiter only counts as such outside of a quoted region. When it
    /// collides with one of the other structural units, the delimiter wins
    /// outside of quotes.
    pub fn classify(&self, unit: u32) -> Class {
        if self.state == State::Default && unit == self.delimiter {
            Class::Delimiter
        } else if unit == quote(self.enc) {
            Class::Quote
        } else if unit == backslash(self.enc) {
            Class::Backslash
        } else if unit == newline(self.enc) {
            Class::Newline
        } else {
            Class::Other
        }
    }

    /// Feed the next code unit of input.
    pub fn step(&mut self, unit: u32) -> Step {
        let mut prefix = None;
        if self.escape_pending {
            self.escape_pending = false;
            match resolve_escape(unit, self.enc, self.escape) {
                Resolution::Resolved(lit) => {
                    return Step::new(Action::Literal(lit));
                }
                Resolution::Invalid(err) => {
                    return Step::new(Action::Fail(err));
                }
                Resolution::Passthrough(lit) => prefix = Some(lit),
            }
        }

        let class = self.classify(unit);
        let (action, next) =
            dispatch(self.state, class, self.prev_quote, self.escape);
        self.state = next;
        self.prev_quote = unit == quote(self.enc);
        if action == Action::ArmEscape {
            self.escape_pending = true;
        }
        Step { prefix: prefix, action: action }
    }

    /// Signal the end of input.
    ///
    /// `pending` reports whether the caller holds any field or row data not
    /// yet emitted as a record. This returns `EndRecord` unless (in strict
    /// mode) an escape is still armed, or a quoted region is still open
    /// while data is pending. A quote opened with nothing pending is
    /// dropped along with the empty record.
    pub fn finish(&mut self, pending: bool) -> Step {
        let mut prefix = None;
        if self.escape_pending {
            self.escape_pending = false;
            if self.escape == Escape::Strict {
                return Step::new(Action::Fail(SyntaxError::DanglingEscape));
            }
            prefix = Some(backslash(self.enc));
        }
        let pending = pending || prefix.is_some();
        if self.state == State::InQuotedField && pending {
            return Step {
                prefix: prefix,
                action: Action::Fail(SyntaxError::UnterminatedQuote),
            };
        }
        Step { prefix: prefix, action: Action::EndRecord }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use super::Action::*;

    fn steps(escape: Escape, input: &str) -> Vec<Step> {
        let mut m = Machine::new(Encoding::Utf8, b',', escape);
        let mut steps: Vec<Step> =
            input.bytes().map(|b| m.step(b as u32)).collect();
        steps.push(m.finish(true));
        steps
    }

    fn actions(escape: Escape, input: &str) -> Vec<Action> {
        steps(escape, input).into_iter().map(|s| s.action).collect()
    }

    #[test]
    fn escape_flags() {
        assert_eq!(Escape::Disabled, Escape::new(false, true));
        assert_eq!(Escape::Disabled, Escape::new(false, false));
        assert_eq!(Escape::Lenient, Escape::new(true, false));
        assert_eq!(Escape::Strict, Escape::new(true, true));
        assert_eq!(Escape::Strict, Escape::default());
    }

    #[test]
    fn dispatch_default() {
        let e = Escape::Strict;
        let d = State::Default;
        let q = State::InQuotedField;
        assert_eq!((EndField, d), dispatch(d, Class::Delimiter, false, e));
        assert_eq!((Skip, q), dispatch(d, Class::Quote, false, e));
        assert_eq!((ArmEscape, d), dispatch(d, Class::Backslash, false, e));
        assert_eq!((EndRecord, d), dispatch(d, Class::Newline, false, e));
        assert_eq!((Keep, d), dispatch(d, Class::Other, true, e));
    }

    #[test]
    fn dispatch_quoted() {
        let e = Escape::Lenient;
        let d = State::Default;
        let q = State::InQuotedField;
        assert_eq!((Keep, q), dispatch(q, Class::Quote, true, e));
        assert_eq!((Skip, d), dispatch(q, Class::Quote, false, e));
        assert_eq!((ArmEscape, q), dispatch(q, Class::Backslash, false, e));
        assert_eq!(
            (Fail(SyntaxError::NewlineInQuote), q),
            dispatch(q, Class::Newline, false, e)
        );
        assert_eq!((Keep, q), dispatch(q, Class::Other, false, e));
    }

    #[test]
    fn dispatch_escape_disabled() {
        let e = Escape::Disabled;
        let d = State::Default;
        let q = State::InQuotedField;
        assert_eq!((Keep, d), dispatch(d, Class::Backslash, false, e));
        assert_eq!((Keep, q), dispatch(q, Class::Backslash, false, e));
    }

    #[test]
    fn delimiter_is_literal_in_quotes() {
        let mut m = Machine::new(Encoding::Utf8, b',', Escape::Strict);
        assert_eq!(Class::Delimiter, m.classify(',' as u32));
        m.step('"' as u32);
        assert_eq!(State::InQuotedField, m.state());
        assert_eq!(Class::Other, m.classify(',' as u32));
    }

    #[test]
    fn simple_record() {
        assert_eq!(
            vec![Keep, EndField, Keep, EndRecord, EndRecord],
            actions(Escape::Strict, "a,b\n")
        );
    }

    #[test]
    fn quoted_field() {
        assert_eq!(
            vec![Skip, Keep, Keep, Skip, EndRecord],
            actions(Escape::Strict, "\"a,\"")
        );
    }

    #[test]
    fn doubled_quote_reopens() {
        // "ab""cd" closes after `b` and reopens on the next quote.
        assert_eq!(
            vec![Skip, Keep, Keep, Skip, Skip, Keep, Keep, Skip, EndRecord],
            actions(Escape::Strict, "\"ab\"\"cd\"")
        );
    }

    #[test]
    fn empty_quotes_yield_quote() {
        let mut m = Machine::new(Encoding::Utf8, b',', Escape::Strict);
        assert_eq!(Skip, m.step('"' as u32).action);
        assert_eq!(Keep, m.step('"' as u32).action);
        assert_eq!(State::InQuotedField, m.state());
        assert_eq!(
            Fail(SyntaxError::UnterminatedQuote),
            m.finish(true).action
        );
    }

    #[test]
    fn open_quote_without_data() {
        let mut m = Machine::new(Encoding::Utf8, b',', Escape::Strict);
        assert_eq!(Skip, m.step('"' as u32).action);
        assert_eq!(EndRecord, m.finish(false).action);

        let mut m = Machine::new(Encoding::Utf8, b',', Escape::Lenient);
        m.step('"' as u32);
        m.step('\\' as u32);
        assert_eq!(
            Step {
                prefix: Some('\\' as u32),
                action: Fail(SyntaxError::UnterminatedQuote),
            },
            m.finish(false)
        );
    }

    #[test]
    fn escapes_resolve() {
        assert_eq!(
            vec![
                ArmEscape,
                Literal('"' as u32),
                ArmEscape,
                Literal('\n' as u32),
                ArmEscape,
                Literal('\\' as u32),
                EndRecord,
            ],
            actions(Escape::Strict, r#"\"\n\\"#)
        );
    }

    // A quote resolved from an escape does not count as the previous quote,
    // so the quote after it closes the region.
    #[test]
    fn escaped_quote_then_close() {
        assert_eq!(
            vec![Skip, Keep, ArmEscape, Literal('"' as u32), Skip, EndRecord],
            actions(Escape::Strict, r#""a\"""#)
        );
    }

    #[test]
    fn strict_escape_fails() {
        let got = actions(Escape::Strict, r"\t");
        assert_eq!(Fail(SyntaxError::InvalidEscape('t' as u32)), got[1]);
    }

    #[test]
    fn lenient_escape_passes_through() {
        let got = steps(Escape::Lenient, r"\,");
        assert_eq!(Step { prefix: None, action: ArmEscape }, got[0]);
        assert_eq!(
            Step { prefix: Some('\\' as u32), action: EndField },
            got[1]
        );
    }

    #[test]
    fn dangling_escape() {
        assert_eq!(
            Fail(SyntaxError::DanglingEscape),
            actions(Escape::Strict, r"a\")[2]
        );
        assert_eq!(
            Step { prefix: Some('\\' as u32), action: EndRecord },
            steps(Escape::Lenient, r"a\")[2]
        );
    }

    #[test]
    fn newline_in_quote() {
        assert_eq!(
            Fail(SyntaxError::NewlineInQuote),
            actions(Escape::Strict, "\"a\n")[2]
        );
    }

    #[test]
    fn escape_armed_in_quotes() {
        let mut m = Machine::new(Encoding::Utf8, b',', Escape::Strict);
        m.step('"' as u32);
        assert_eq!(ArmEscape, m.step('\\' as u32).action);
        assert!(m.is_escape_pending());
        assert_eq!(Literal('\n' as u32), m.step('n' as u32).action);
        assert_eq!(State::InQuotedField, m.state());
    }

    #[test]
    fn wide_units() {
        let mut m = Machine::new(Encoding::Utf16Le, b';', Escape::Disabled);
        assert_eq!(Keep, m.step(0x00E9).action);
        assert_eq!(EndField, m.step(';' as u32).action);
        // A unit whose low byte matches the delimiter is not a delimiter.
        assert_eq!(Keep, m.step(0x013B).action);
        assert_eq!(Keep, m.step('\\' as u32).action);
    }

    #[test]
    fn reset_clears_state() {
        let mut m = Machine::new(Encoding::Utf8, b',', Escape::Strict);
        m.step('"' as u32);
        m.step('\\' as u32);
        m.reset();
        assert_eq!(State::Default, m.state());
        assert!(!m.is_escape_pending());
        assert_eq!(EndRecord, m.finish(false).action);
    }

    #[test]
    fn syntax_error_display() {
        assert_eq!(
            "unrecognized escape sequence '\\t'",
            SyntaxError::InvalidEscape('t' as u32).to_string()
        );
        assert_eq!(
            "unrecognized escape sequence: backslash followed by U+0009",
            SyntaxError::InvalidEscape(9).to_string()
        );
    }
}
