//! IRC front of the generator.
//!
//! Input records are newline-delimited, space-separated byte strings:
//! `recipient [seed words...]`. Each record is answered with one or more
//! CRLF-terminated `PRIVMSG` lines.

use std::io::{BufRead, Write};

use log::{debug, trace};

use crate::brain::{AssociationStore, Token, strip_terminator};
use crate::error::Result;
use crate::random::RandomSource;
use crate::walker::ChainWalker;

/// CTCP ACTION opener as it appears inside a generated sentence.
pub const ACTION_MARKER: &[u8] = b"\x01ACTION";

/// CTCP delimiter.
const CTCP_DELIM: u8 = 0x01;

/// One input record: who to answer and which words may seed the sentence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
	pub recipient: Token,
	pub words: Vec<Token>,
}

impl Record {
	/// Parses one input line.
	///
	/// The trailing `\n` / `\r\n` is dropped and the line is split on spaces;
	/// empty tokens (repeated spaces) are ignored.
	///
	/// Returns `None` for a line with no tokens.
	pub fn parse(line: &[u8]) -> Option<Self> {
		let line = line.strip_suffix(b"\n").unwrap_or(line);
		let line = line.strip_suffix(b"\r").unwrap_or(line);

		let mut tokens = line.split(|byte| *byte == b' ').filter(|token| !token.is_empty());
		let recipient = tokens.next()?.to_vec();
		let words = tokens.map(<[u8]>::to_vec).collect();

		Some(Self { recipient, words })
	}

	/// Picks the seed word for this record.
	///
	/// - No words: `chain1` of a random row, or its `chain2` (without
	///   terminator) when the row has no `chain1`
	/// - One word: that word
	/// - Several words: one of them, uniformly
	///
	/// # Errors
	/// `BrainError::EmptyStore` when a random row is needed and the table is empty.
	pub fn seed<S: AssociationStore + ?Sized>(&self, store: &S, rng: &mut dyn RandomSource) -> Result<Token> {
		match self.words.len() {
			0 => {
				let link = store.random_row(rng)?;
				Ok(match link.chain1 {
					Some(chain1) => chain1,
					None => strip_terminator(&link.chain2)
						.map(<[u8]>::to_vec)
						.unwrap_or(link.chain2),
				})
			}
			1 => Ok(self.words[0].clone()),
			n => Ok(self.words[rng.choose_index(n)].clone()),
		}
	}
}

/// Formats `PRIVMSG <recipient> :<text>\r\n`.
pub fn privmsg(recipient: &[u8], text: &[u8]) -> Vec<u8> {
	let mut line = Vec::with_capacity(recipient.len() + text.len() + 12);
	line.extend_from_slice(b"PRIVMSG ");
	line.extend_from_slice(recipient);
	line.extend_from_slice(b" :");
	line.extend_from_slice(text);
	line.extend_from_slice(b"\r\n");
	line
}

/// Renders a generated sentence as protocol lines.
///
/// A sentence without [`ACTION_MARKER`] becomes a single `PRIVMSG`, verbatim.
/// Otherwise the sentence is split on the marker:
/// - the leading part is sent as a plain `PRIVMSG` as-is, even when empty
/// - every following part is trimmed, stripped of `\x01` bytes and sent
///   as `\x01ACTION <text>\x01`
pub fn render(recipient: &[u8], sentence: &[u8]) -> Vec<Vec<u8>> {
	let mut parts = split_on(sentence, ACTION_MARKER).into_iter();
	let Some(head) = parts.next() else {
		return Vec::new();
	};
	if parts.len() == 0 {
		return vec![privmsg(recipient, sentence)];
	}

	let mut lines = vec![privmsg(recipient, head)];

	for part in parts {
		let mut text = ACTION_MARKER.to_vec();
		text.push(b' ');
		text.extend(part.trim_ascii().iter().filter(|byte| **byte != CTCP_DELIM));
		text.push(CTCP_DELIM);
		lines.push(privmsg(recipient, &text));
	}

	lines
}

/// Splits `haystack` on every occurrence of `needle`. Always yields at least one part.
fn split_on<'a>(haystack: &'a [u8], needle: &[u8]) -> Vec<&'a [u8]> {
	let mut parts = Vec::new();
	let mut rest = haystack;
	while let Some(at) = rest.windows(needle.len()).position(|window| window == needle) {
		parts.push(&rest[..at]);
		rest = &rest[at + needle.len()..];
	}
	parts.push(rest);
	parts
}

/// Answers every record of `input` on `output`, flushing after each record.
///
/// Blank records are skipped. Returns the number of records answered.
///
/// # Errors
/// Stops at the first error: an empty brain, a store failure, or an I/O error
/// on either stream.
pub fn serve<S, R, I, O>(walker: &mut ChainWalker<S, R>, input: I, mut output: O) -> Result<usize>
where
	S: AssociationStore,
	R: RandomSource,
	I: BufRead,
	O: Write,
{
	let mut answered = 0;

	for line in input.split(b'\n') {
		let line = line?;
		let Some(record) = Record::parse(&line) else {
			trace!("skipping blank record");
			continue;
		};

		let seed = {
			let (store, rng) = walker.parts_mut();
			record.seed(store, rng)?
		};
		let sentence = walker.generate(&seed)?;

		for message in render(&record.recipient, &sentence) {
			output.write_all(&message)?;
		}
		output.flush()?;

		answered += 1;
		debug!(
			"answered {} with {} bytes",
			String::from_utf8_lossy(&record.recipient),
			sentence.len()
		);
	}

	Ok(answered)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::brain::{MemoryBrain, Row};
	use crate::error::BrainError;
	use crate::random::ScriptedSource;
	use pretty_assertions::assert_eq;

	#[test]
	fn parse_splits_recipient_and_words() {
		let record = Record::parse(b"#chan hi there\r\n").unwrap();
		assert_eq!(record.recipient, b"#chan".to_vec());
		assert_eq!(record.words, vec![b"hi".to_vec(), b"there".to_vec()]);
	}

	#[test]
	fn parse_blank_line_is_none() {
		assert_eq!(Record::parse(b""), None);
		assert_eq!(Record::parse(b"\n"), None);
		assert_eq!(Record::parse(b"   \r\n"), None);
	}

	#[test]
	fn parse_ignores_repeated_spaces() {
		let record = Record::parse(b"nick  word").unwrap();
		assert_eq!(record.words, vec![b"word".to_vec()]);
	}

	#[test]
	fn parse_keeps_raw_bytes() {
		let record = Record::parse(b"#chan \xFF\xFE").unwrap();
		assert_eq!(record.words, vec![vec![0xFF, 0xFE]]);
	}

	#[test]
	fn seed_from_single_word() {
		let brain = MemoryBrain::default();
		let record = Record::parse(b"#chan hi").unwrap();
		let mut rng = ScriptedSource::default();
		assert_eq!(record.seed(&brain, &mut rng).unwrap(), b"hi".to_vec());
	}

	#[test]
	fn seed_chosen_among_words() {
		let brain = MemoryBrain::default();
		let record = Record::parse(b"#chan a b c").unwrap();
		let mut rng = ScriptedSource::new([2]);
		assert_eq!(record.seed(&brain, &mut rng).unwrap(), b"c".to_vec());
	}

	#[test]
	fn seed_from_random_row() {
		let brain = MemoryBrain::from_rows([
			Row::new(b"a", Some(b"first"), b"b"),
			Row::new(b"b", None, b"last\x1E"),
		]);
		let record = Record::parse(b"nick").unwrap();

		let mut rng = ScriptedSource::new([1]);
		assert_eq!(record.seed(&brain, &mut rng).unwrap(), b"first".to_vec());

		let mut rng = ScriptedSource::new([2]);
		assert_eq!(record.seed(&brain, &mut rng).unwrap(), b"last".to_vec());
	}

	#[test]
	fn seed_from_empty_brain_fails() {
		let record = Record::parse(b"nick").unwrap();
		let mut rng = ScriptedSource::default();
		let result = record.seed(&MemoryBrain::default(), &mut rng);
		assert!(matches!(result, Err(BrainError::EmptyStore)));
	}

	#[test]
	fn render_plain_sentence() {
		let lines = render(b"#chan", b"hi there");
		assert_eq!(lines, vec![b"PRIVMSG #chan :hi there\r\n".to_vec()]);
	}

	#[test]
	fn render_splits_actions() {
		let lines = render(b"#chan", b"hello \x01ACTION waves\x01 \x01ACTION bows");
		assert_eq!(
			lines,
			vec![
				b"PRIVMSG #chan :hello \r\n".to_vec(),
				b"PRIVMSG #chan :\x01ACTION waves\x01\r\n".to_vec(),
				b"PRIVMSG #chan :\x01ACTION bows\x01\r\n".to_vec(),
			]
		);
	}

	#[test]
	fn render_sends_empty_leading_part() {
		let lines = render(b"nick", b"\x01ACTION dances");
		assert_eq!(
			lines,
			vec![
				b"PRIVMSG nick :\r\n".to_vec(),
				b"PRIVMSG nick :\x01ACTION dances\x01\r\n".to_vec(),
			]
		);
	}

	#[test]
	fn render_keeps_leading_whitespace_verbatim() {
		let lines = render(b"#chan", b"hello \x01ACTION waves");
		assert_eq!(lines[0], b"PRIVMSG #chan :hello \r\n".to_vec());
		assert_eq!(lines.len(), 2);
	}

	#[test]
	fn split_on_without_needle() {
		assert_eq!(split_on(b"abc", b"x"), vec![&b"abc"[..]]);
		assert_eq!(split_on(b"axbx", b"x"), vec![&b"a"[..], &b"b"[..], &b""[..]]);
	}

	#[test]
	fn serve_answers_and_skips_blank_lines() {
		let brain = MemoryBrain::from_rows([Row::new(b"hi", None, b"there\x1E")]);
		let mut walker = ChainWalker::new(brain, ScriptedSource::default());
		let mut output = Vec::new();

		let answered = serve(&mut walker, &b"#chan hi\n\n"[..], &mut output).unwrap();
		assert_eq!(answered, 1);
		assert_eq!(output, b"PRIVMSG #chan :hi there\r\n".to_vec());
	}

	#[test]
	fn serve_propagates_empty_brain() {
		let mut walker = ChainWalker::new(MemoryBrain::default(), ScriptedSource::default());
		let mut output = Vec::new();
		let result = serve(&mut walker, &b"nick\n"[..], &mut output);
		assert!(matches!(result, Err(BrainError::EmptyStore)));
		assert!(output.is_empty());
	}
}
