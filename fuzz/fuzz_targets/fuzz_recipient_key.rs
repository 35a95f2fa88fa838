#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    if let Ok(key) = quorum_core::RecipientKey::from_armored(data) {
        let _ = key.fingerprint();
        let _ = key.encrypt(b"00000000-0000-0000-0000-000000000000");
    }
    if let Ok(keypair) = quorum_core::RecipientKeypair::from_armored(data) {
        let _ = keypair.decrypt(data.as_bytes());
    }
});
