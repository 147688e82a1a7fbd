//! HMAC-SHA256 (RFC 2104).
//!
//! Keys longer than one block are first hashed; shorter keys are zero-padded
//! to the block size. Keys and messages may be empty and may contain zero
//! bytes.

use super::sha256::{self, Digest, Sha256, BLOCK_LEN};

const IPAD: u8 = 0x36;
const OPAD: u8 = 0x5c;

/// Keyed streaming MAC. The inner hash is fed as data arrives; the outer
/// hash is run once on `finalize`.
#[derive(Clone)]
pub struct HmacSha256 {
    inner: Sha256,
    outer_key: [u8; BLOCK_LEN],
}

impl HmacSha256 {
    pub fn new(key: &[u8]) -> Self {
        let mut block_key = [0u8; BLOCK_LEN];
        if key.len() > BLOCK_LEN {
            let digest = sha256::hash(key);
            block_key[..digest.as_bytes().len()].copy_from_slice(digest.as_bytes());
        } else {
            block_key[..key.len()].copy_from_slice(key);
        }

        let mut inner_key = [0u8; BLOCK_LEN];
        let mut outer_key = [0u8; BLOCK_LEN];
        for ((i, o), &k) in inner_key
            .iter_mut()
            .zip(outer_key.iter_mut())
            .zip(block_key.iter())
        {
            *i = k ^ IPAD;
            *o = k ^ OPAD;
        }

        let mut inner = Sha256::new();
        inner.update(&inner_key);

        Self { inner, outer_key }
    }

    pub fn update(&mut self, message: &[u8]) {
        self.inner.update(message);
    }

    pub fn finalize(self) -> Digest {
        let inner_digest = self.inner.finalize();

        let mut outer = Sha256::new();
        outer.update(&self.outer_key);
        outer.update(inner_digest.as_bytes());
        outer.finalize()
    }
}

/// One-shot HMAC-SHA256 of `message` under `key`.
pub fn hmac_sha256(key: &[u8], message: &[u8]) -> Digest {
    let mut mac = HmacSha256::new(key);
    mac.update(message);
    mac.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference(key: &[u8], message: &[u8]) -> [u8; 32] {
        use ::hmac::Mac;
        let mut mac = ::hmac::Hmac::<sha2::Sha256>::new_from_slice(key).unwrap();
        mac.update(message);
        mac.finalize().into_bytes().into()
    }

    #[test]
    fn rfc4231_case_1() {
        let key = [0x0bu8; 20];
        assert_eq!(
            hmac_sha256(&key, b"Hi There").to_hex(),
            "b0344c61d8db38535ca8afceaf0bf12b881dc200c9833da726e9376c2e32cff7"
        );
    }

    #[test]
    fn rfc4231_case_2_short_key() {
        assert_eq!(
            hmac_sha256(b"Jefe", b"what do ya want for nothing?").to_hex(),
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn rfc4231_case_3() {
        let key = [0xaau8; 20];
        let msg = [0xddu8; 50];
        assert_eq!(
            hmac_sha256(&key, &msg).to_hex(),
            "773ea91e36800e46854db8ebd09181a72959098b3ef8c122d9635514ced565fe"
        );
    }

    #[test]
    fn rfc4231_case_4() {
        let key: Vec<u8> = (0x01..=0x19).collect();
        let msg = [0xcdu8; 50];
        assert_eq!(
            hmac_sha256(&key, &msg).to_hex(),
            "82558a389a443c0ea4cc819899f2083a85f0faa3e578f8077a2e3ff46729665b"
        );
    }

    #[test]
    fn rfc4231_case_5_truncated() {
        let key = [0x0cu8; 20];
        let mac = hmac_sha256(&key, b"Test With Truncation");
        assert_eq!(
            hex::encode(&mac.as_bytes()[..16]),
            "a3b6167473100ee06e0c796c2955552b"
        );
    }

    #[test]
    fn rfc4231_case_6_long_key() {
        let key = [0xaau8; 131];
        assert_eq!(
            hmac_sha256(&key, b"Test Using Larger Than Block-Size Key - Hash Key First").to_hex(),
            "60e431591ee0b67f0d8a26aacbf5b77f8e0bc6213728c5140546040f0ee37f54"
        );
    }

    #[test]
    fn rfc4231_case_7_long_key_and_data() {
        let key = [0xaau8; 131];
        let msg = b"This is a test using a larger than block-size key and a larger than block-size data. The key needs to be hashed before being used by the HMAC algorithm.";
        assert_eq!(
            hmac_sha256(&key, msg).to_hex(),
            "9b09ffa71b942fcb27635fbcd5b0e944bfdc63644f0713938a7f51535c3a35e2"
        );
    }

    #[test]
    fn block_sized_key_is_not_hashed() {
        let key = [0x42u8; BLOCK_LEN];
        assert_eq!(hmac_sha256(&key, b"msg").as_bytes(), &reference(&key, b"msg"));

        let longer = [0x42u8; BLOCK_LEN + 1];
        assert_eq!(
            hmac_sha256(&longer, b"msg").as_bytes(),
            &reference(&longer, b"msg")
        );
    }

    #[test]
    fn empty_key_and_message() {
        assert_eq!(hmac_sha256(b"", b"").as_bytes(), &reference(b"", b""));
    }

    #[test]
    fn matches_reference_across_lengths() {
        let source: Vec<u8> = (0..=300u32).map(|i| (i * 13 + 5) as u8).collect();
        for key_len in [0usize, 1, 20, 63, 64, 65, 131, 300] {
            for msg_len in [0usize, 1, 55, 56, 64, 200] {
                let key = &source[..key_len];
                let msg = &source[..msg_len];
                assert_eq!(
                    hmac_sha256(key, msg).as_bytes(),
                    &reference(key, msg),
                    "key {key_len} msg {msg_len}"
                );
            }
        }
    }

    #[test]
    fn streaming_matches_one_shot() {
        let mut mac = HmacSha256::new(b"key");
        mac.update(b"The quick brown fox ");
        mac.update(b"jumps over the lazy dog");
        assert_eq!(
            mac.finalize(),
            hmac_sha256(b"key", b"The quick brown fox jumps over the lazy dog")
        );
    }
}
