#![no_main]

//! Fuzz target for the pbxproj reader and writer.
//!
//! Arbitrary text must never panic the parser. Anything that parses must
//! write out as text that parses again and writes back to the same bytes;
//! bare strings the writer has to quote only change on the first pass.

use extpatch_pbx::{NoComments, parse, to_string};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };

    let Ok(value) = parse(s) else {
        return;
    };

    let written = to_string(&value, &NoComments);
    let reparsed = parse(&written).expect("written pbxproj must parse");
    assert_eq!(to_string(&reparsed, &NoComments), written);
});
