#![no_main]

use credential_core::crypto::{hash, Sha256};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let split = data.first().map_or(0, |&b| b as usize).min(data.len());
    let mut sha = Sha256::new();
    sha.update(&data[..split]);
    sha.update(&data[split..]);
    assert_eq!(sha.finalize(), hash(data));
});
