//! Property-based tests for the envelope codec.

use std::collections::HashSet;
use std::sync::Mutex;

use proptest::prelude::*;

use crate::keys::{EnvelopeKey, KEY_LEN};
use crate::{CodecError, NONCE_LEN, OVERHEAD, open, seal};

fn arb_key() -> impl Strategy<Value = EnvelopeKey> {
    any::<[u8; KEY_LEN]>().prop_map(EnvelopeKey::from_bytes)
}

proptest! {
    #[test]
    fn seal_open_roundtrip(key in arb_key(), plaintext in prop::collection::vec(any::<u8>(), 0..2048)) {
        let envelope = seal(&key, &plaintext).unwrap();
        prop_assert_eq!(envelope.len(), plaintext.len() + OVERHEAD);
        prop_assert_eq!(open(&key, &envelope).unwrap(), plaintext);
    }

    /// Any single flipped bit, whether in nonce, ciphertext or tag, is rejected.
    #[test]
    fn bit_flip_is_rejected(
        key in arb_key(),
        plaintext in prop::collection::vec(any::<u8>(), 0..256),
        position in any::<prop::sample::Index>(),
        bit in 0u8..8,
    ) {
        let mut envelope = seal(&key, &plaintext).unwrap();
        let idx = position.index(envelope.len());
        envelope[idx] ^= 1 << bit;
        prop_assert_eq!(open(&key, &envelope), Err(CodecError::AuthenticationFailure));
    }

    #[test]
    fn other_key_is_rejected(a in arb_key(), b in arb_key(), plaintext in prop::collection::vec(any::<u8>(), 0..128)) {
        prop_assume!(a != b);
        let envelope = seal(&a, &plaintext).unwrap();
        prop_assert_eq!(open(&b, &envelope), Err(CodecError::AuthenticationFailure));
    }
}

#[test]
fn concurrent_seals_never_repeat_a_nonce() {
    const THREADS: usize = 16;
    const PER_THREAD: usize = 640;

    let key = crate::keys::generate_key();
    let nonces = Mutex::new(Vec::with_capacity(THREADS * PER_THREAD));

    std::thread::scope(|s| {
        for _ in 0..THREADS {
            s.spawn(|| {
                let local: Vec<[u8; NONCE_LEN]> = (0..PER_THREAD)
                    .map(|_| {
                        let envelope = seal(&key, b"{}").unwrap();
                        envelope[..NONCE_LEN].try_into().unwrap()
                    })
                    .collect();
                nonces.lock().unwrap().extend(local);
            });
        }
    });

    let nonces = nonces.into_inner().unwrap();
    assert_eq!(nonces.len(), THREADS * PER_THREAD);
    assert!(nonces.len() >= 10_000);

    let distinct: HashSet<_> = nonces.iter().collect();
    assert_eq!(distinct.len(), nonces.len());
}
