#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }
    let width = (data[0] as usize % 33).max(2);
    let parts: Vec<&[u8]> = data[1..].chunks(width).collect();
    let _ = quorum_core::shamir::combine(&parts);
});
