//! Fuzz target: `LineAssembler::push` + `decode`
//!
//! Drives arbitrary bytes through the line assembler and decodes every
//! completed line.  Lines must stay within the cap, decoding must never
//! panic, and every accepted message must re-encode to a line that
//! decodes to the same message.
//!
//! cargo fuzz run fuzz_line_decoder

#![no_main]

use libfuzzer_sys::fuzz_target;
use wclock::protocol::codec::{LINE_CAP, LineAssembler};
use wclock::protocol::{decode, encode};

fuzz_target!(|data: &[u8]| {
    let mut asm = LineAssembler::new();

    for &b in data {
        let Some(Ok(line)) = asm.push(b) else { continue };
        assert!(line.len() <= LINE_CAP, "line exceeds LINE_CAP");

        if let Ok(msg) = decode(&line) {
            // Hex case and trailing text may differ, the message may not.
            let again = encode(&msg).expect("decoded message must re-encode");
            assert_eq!(decode(&again), Ok(msg));
        }
    }

    // After a reset the assembler must accept bytes cleanly again.
    asm.reset();
    for &b in data {
        let _ = asm.push(b);
    }
});
