#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: (&str, &str)| {
    let (encoded, otp) = data;
    let _ = quorum_core::OutputMode::from_params(Some(otp), None);
    let _ = quorum_core::decode_otp(encoded, otp);
});
