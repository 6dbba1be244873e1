use log::{debug, trace};

use crate::brain::{AssociationStore, TERMINATOR, Token};
use crate::error::Result;
use crate::random::RandomSource;

/// Consecutive backward hits without `chain1` tolerated before the backward pass gives up.
pub const STALLED_HITS: usize = 8;

/// Target lengths of one generation run.
///
/// ## Invariants
/// - `1 <= backtrack_len <= want_len` when drawn with [`LengthPlan::draw`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LengthPlan {
	/// The forward pass keeps extending while the sentence has at most this many tokens.
	pub want_len: usize,
	/// The backward pass keeps extending while the sentence has at most this many tokens.
	pub backtrack_len: usize,
}

impl LengthPlan {
	/// Draws a plan.
	///
	/// A base value is drawn from `[1, 10]`:
	/// - `1`: the length is redrawn from `[1, 10]` (short sentence)
	/// - `10`: the length is drawn from `[21, 26]` (long sentence)
	/// - otherwise: the length is drawn from `[10, 21]`
	///
	/// `backtrack_len` is then drawn from `[1, want_len]`.
	pub fn draw(rng: &mut dyn RandomSource) -> Self {
		let want_len = match rng.int_inclusive(1, 10) {
			1 => rng.int_inclusive(1, 10),
			10 => rng.int_inclusive(21, 26),
			_ => rng.int_inclusive(10, 21),
		};
		let backtrack_len = rng.int_inclusive(1, want_len);

		Self {
			want_len: want_len as usize,
			backtrack_len: backtrack_len as usize,
		}
	}
}

/// Builds sentences by walking an association table around a seed word.
///
/// # Responsibilities
/// - Draw a [`LengthPlan`]
/// - Extend the sentence to the left of the seed (backward pass)
/// - Extend it to the right until the plan is met or a terminator is reached (forward pass)
///
/// The store and the random source are owned by the walker; nothing else is
/// shared between calls, so two walkers over the same read-only store can run
/// on separate threads.
#[derive(Debug)]
pub struct ChainWalker<S, R> {
	store: S,
	rng: R,
}

impl<S: AssociationStore, R: RandomSource> ChainWalker<S, R> {
	pub fn new(store: S, rng: R) -> Self {
		Self { store, rng }
	}

	/// Borrows the store and the random source together.
	pub fn parts_mut(&mut self) -> (&S, &mut R) {
		(&self.store, &mut self.rng)
	}

	/// Generates a sentence from `seed`, tokens joined with single spaces.
	///
	/// # Errors
	/// - `BrainError::EmptyStore` if the forward pass needs a random row and the table is empty
	/// - backend errors from the store
	pub fn generate(&mut self, seed: &[u8]) -> Result<Vec<u8>> {
		Ok(self.generate_tokens(seed)?.join(&b' '))
	}

	/// Generates a sentence from `seed` as a token list.
	pub fn generate_tokens(&mut self, seed: &[u8]) -> Result<Vec<Token>> {
		let plan = LengthPlan::draw(&mut self.rng);
		debug!("plan: want {} tokens, backtrack {}", plan.want_len, plan.backtrack_len);
		self.walk(seed, plan)
	}

	/// Runs both passes with a given plan.
	///
	/// The seed is trimmed of surrounding ASCII whitespace. When the backward
	/// pass finds nothing, the seed itself opens the sentence; otherwise the
	/// backward result already ends with it.
	pub fn walk(&mut self, seed: &[u8], plan: LengthPlan) -> Result<Vec<Token>> {
		let seed = seed.trim_ascii();

		let mut sentence = self.backward(seed, plan.backtrack_len)?;
		trace!("backward pass produced {} tokens", sentence.len());
		if sentence.is_empty() {
			sentence.push(seed.to_vec());
		}

		let sentence = self.forward(seed, sentence, plan.want_len)?;
		trace!("forward pass produced {} tokens", sentence.len());
		Ok(sentence)
	}

	/// Extends to the left of `seed` while the sentence has at most `backtrack_len` tokens.
	///
	/// Each hit `(chain1, chain2)` has `chain2` equal to the current first token;
	/// the pair replaces that token and the new first token becomes the next
	/// lookup key. A hit without `chain1` leaves the key unchanged, so the same
	/// key is queried again; after [`STALLED_HITS`] such hits in a row the pass stops.
	fn backward(&mut self, seed: &[u8], backtrack_len: usize) -> Result<Vec<Token>> {
		let mut sentence: Vec<Token> = Vec::new();
		let mut seed = seed.to_vec();
		let mut stalled = 0;

		while sentence.len() <= backtrack_len {
			let Some(link) = self.store.lookup_by_successor(&seed, &mut self.rng)? else {
				break;
			};

			if link.chain1.is_none() {
				stalled += 1;
			} else {
				stalled = 0;
			}

			let mut spliced = link.into_tokens();
			spliced.extend(sentence.into_iter().skip(1));
			sentence = spliced;
			seed = sentence[0].clone();

			if stalled >= STALLED_HITS {
				break;
			}
		}

		Ok(sentence)
	}

	/// Extends to the right, starting from `seed`, while the sentence has at most
	/// `want_len` tokens and no terminator has been seen.
	///
	/// A keyword miss falls back to a random row. A last appended token ending
	/// with [`TERMINATOR`] loses the marker and ends the pass.
	fn forward(&mut self, seed: &[u8], mut sentence: Vec<Token>, want_len: usize) -> Result<Vec<Token>> {
		let mut seed = seed.to_vec();
		let mut terminated = false;

		while sentence.len() <= want_len && !terminated {
			let link = match self.store.lookup_by_keyword(&seed, &mut self.rng)? {
				Some(link) => link,
				None => {
					trace!("no row for keyword, using a random row");
					self.store.random_row(&mut self.rng)?
				}
			};

			sentence.extend(link.into_tokens());
			// A link always contributes chain2
			let Some(last) = sentence.last_mut() else {
				break;
			};
			seed = last.clone();
			if last.last() == Some(&TERMINATOR) {
				last.pop();
				terminated = true;
			}
		}

		Ok(sentence)
	}
}
