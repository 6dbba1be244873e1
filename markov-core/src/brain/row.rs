use serde::{Deserialize, Serialize};

/// A word token, kept as raw bytes: the brain is not required to be UTF-8.
pub type Token = Vec<u8>;

/// Trailing byte on `chain2` meaning "the sentence may end here".
pub const TERMINATOR: u8 = 0x1E;

/// Returns the token without its termination marker, or `None` if it has none.
pub fn strip_terminator(token: &[u8]) -> Option<&[u8]> {
	token.strip_suffix(&[TERMINATOR])
}

/// One record of the association table.
///
/// ## Invariants
/// - `keyword` and `chain2` are never null
/// - `chain2` may end with [`TERMINATOR`]
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Row {
	/// Forward-lookup key: the word the chain continues from.
	pub keyword: Token,
	/// Preceding word, absent at the start of a chain.
	pub chain1: Option<Token>,
	/// Following word.
	pub chain2: Token,
}

impl Row {
	pub fn new(keyword: &[u8], chain1: Option<&[u8]>, chain2: &[u8]) -> Self {
		Self {
			keyword: keyword.to_vec(),
			chain1: chain1.map(<[u8]>::to_vec),
			chain2: chain2.to_vec(),
		}
	}

	/// The `(chain1, chain2)` pair returned by every lookup.
	pub fn link(&self) -> Link {
		Link {
			chain1: self.chain1.clone(),
			chain2: self.chain2.clone(),
		}
	}
}

/// The `(chain1, chain2)` pair a lookup yields.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Link {
	pub chain1: Option<Token>,
	pub chain2: Token,
}

impl Link {
	/// Tokens contributed to a sentence, in order: `chain1` (when present) then `chain2`.
	pub fn into_tokens(self) -> Vec<Token> {
		match self.chain1 {
			Some(chain1) => vec![chain1, self.chain2],
			None => vec![self.chain2],
		}
	}
}
