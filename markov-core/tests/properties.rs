//! Property-based tests for the chain walker.

use markov_core::brain::{MemoryBrain, Row, TERMINATOR};
use markov_core::random::{RngSource, ScriptedSource};
use markov_core::walker::{ChainWalker, LengthPlan};
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Strategy helpers
// ---------------------------------------------------------------------------

/// Small vocabulary so that lookups hit often.
fn arb_word() -> impl Strategy<Value = Vec<u8>> {
	prop_oneof![
		Just(b"a".to_vec()),
		Just(b"b".to_vec()),
		Just(b"c".to_vec()),
		Just(b"d".to_vec()),
		Just(b"e".to_vec()),
	]
}

fn arb_row() -> impl Strategy<Value = Row> {
	(arb_word(), proptest::option::of(arb_word()), arb_word(), any::<bool>()).prop_map(
		|(keyword, chain1, mut chain2, terminal)| {
			if terminal {
				chain2.push(TERMINATOR);
			}
			Row { keyword, chain1, chain2 }
		},
	)
}

fn arb_brain() -> impl Strategy<Value = MemoryBrain> {
	prop::collection::vec(arb_row(), 1..40).prop_map(MemoryBrain::from_rows)
}

proptest! {
	#![proptest_config(ProptestConfig::with_cases(200))]

	#[test]
	fn sentence_is_never_empty(brain in arb_brain(), seed in arb_word(), rng_seed in any::<u64>()) {
		let mut walker = ChainWalker::new(&brain, RngSource::seeded(rng_seed));
		let sentence = walker.generate_tokens(&seed).unwrap();
		prop_assert!(!sentence.is_empty());
	}

	#[test]
	fn forward_growth_is_bounded(
		brain in arb_brain(),
		seed in arb_word(),
		want_len in 1usize..=26,
		backtrack in 1usize..=26,
		rng_seed in any::<u64>(),
	) {
		let plan = LengthPlan { want_len, backtrack_len: backtrack.min(want_len) };
		let mut walker = ChainWalker::new(&brain, RngSource::seeded(rng_seed));
		let sentence = walker.walk(&seed, plan).unwrap();
		prop_assert!(sentence.len() <= plan.want_len + 2);
	}

	#[test]
	fn backward_growth_is_bounded(
		brain in arb_brain(),
		seed in arb_word(),
		backtrack_len in 1usize..=26,
		rng_seed in any::<u64>(),
	) {
		// want_len 0 disables the forward pass
		let plan = LengthPlan { want_len: 0, backtrack_len };
		let mut walker = ChainWalker::new(&brain, RngSource::seeded(rng_seed));
		let sentence = walker.walk(&seed, plan).unwrap();
		prop_assert!(sentence.len() <= backtrack_len + 2);
	}

	#[test]
	fn terminator_never_leaks(brain in arb_brain(), seed in arb_word(), rng_seed in any::<u64>()) {
		let mut walker = ChainWalker::new(&brain, RngSource::seeded(rng_seed));
		let sentence = walker.generate_tokens(&seed).unwrap();
		let last = sentence.last().unwrap();
		prop_assert!(last.last() != Some(&TERMINATOR));
	}

	#[test]
	fn identical_draws_identical_sentences(
		brain in arb_brain(),
		seed in arb_word(),
		draws in prop::collection::vec(0i64..30, 0..60),
	) {
		let mut first = ChainWalker::new(&brain, ScriptedSource::new(draws.clone()));
		let mut second = ChainWalker::new(&brain, ScriptedSource::new(draws));
		prop_assert_eq!(first.generate(&seed).unwrap(), second.generate(&seed).unwrap());
	}
}
