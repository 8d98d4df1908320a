use mcbench_core::rng::{derive_substream_seed, trial_seed, RngHandle};
use rand::RngCore;

#[test]
fn rng_emits_reproducible_sequence() {
    let mut rng_a = RngHandle::from_seed(1234);
    let mut rng_b = RngHandle::from_seed(1234);

    let seq_a: Vec<u64> = (0..100).map(|_| rng_a.next_u64()).collect();
    let seq_b: Vec<u64> = (0..100).map(|_| rng_b.next_u64()).collect();

    assert_eq!(seq_a, seq_b);
}

#[test]
fn substream_seeds_are_stable_and_distinct() {
    let a = derive_substream_seed(42, 0);
    let b = derive_substream_seed(42, 1);
    let c = derive_substream_seed(43, 0);

    assert_eq!(a, derive_substream_seed(42, 0));
    assert_ne!(a, b);
    assert_ne!(a, c);
}

#[test]
fn trial_seed_is_base_plus_offset() {
    assert_eq!(trial_seed(100, 0), 100);
    assert_eq!(trial_seed(100, 7), 107);
    assert_eq!(trial_seed(u64::MAX, 1), 0);
}
