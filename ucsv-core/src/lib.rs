/*!
`ucsv-core` holds the allocation free pieces of the `ucsv` decoder: byte
order mark detection, fixed width code unit decoding and the state machine
that classifies each code unit of CSV input.

Nothing in this crate performs I/O. Callers (the `ucsv` crate, primarily)
pull code units out of a byte stream, feed them to a [`Machine`] and act on
the [`Action`]s it hands back.

# Example

```
use ucsv_core::{Action, Encoding, Escape, Machine};

let mut machine = Machine::new(Encoding::Utf8, b',', Escape::Strict);
let mut actions = vec![];
for &b in b"a,\"b\"\n" {
    actions.push(machine.step(b as u32).action);
}
assert_eq!(actions, vec![
    Action::Keep,
    Action::EndField,
    Action::Skip,
    Action::Keep,
    Action::Skip,
    Action::EndRecord,
]);
```
*/

#![deny(missing_docs)]
#![cfg_attr(not(test), no_std)]

pub use crate::encoding::{
    backslash, decode_unit, detect_bom, letter_n, newline, quote, Encoding,
    EncodingMode, BOMS, MAX_BOM_LEN,
};
pub use crate::machine::{
    dispatch, resolve_escape, Action, Class, Escape, Machine, Resolution,
    State, Step, SyntaxError,
};

mod encoding;
mod machine;
