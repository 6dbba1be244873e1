use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use super::AssociationStore;
use super::row::{Link, Row, Token};
use crate::error::Result;
use crate::io::{read_postcard, write_postcard};
use crate::random::RandomSource;

/// On-disk form of a [`MemoryBrain`]: the rows with their identifiers.
///
/// Indices are rebuilt on load rather than serialized.
#[derive(Serialize, Deserialize)]
struct Snapshot {
	rows: Vec<(i64, Row)>,
}

/// Association table held entirely in memory.
///
/// Rows are keyed by their identifier; two hash indices (by `keyword` and by
/// `chain2`) list matching identifiers in ascending order, so a tie broken
/// with index `k` selects the same row as the SQLite backend would.
///
/// ## Invariants
/// - Immutable once built
/// - Every identifier in an index refers to a row in `rows`
#[derive(Debug, Clone, Default)]
pub struct MemoryBrain {
	rows: BTreeMap<i64, Row>,
	by_keyword: HashMap<Token, Vec<i64>>,
	by_successor: HashMap<Token, Vec<i64>>,
}

impl MemoryBrain {
	/// Builds a brain from rows, numbering them from 1 like SQLite rowids.
	pub fn from_rows<I: IntoIterator<Item = Row>>(rows: I) -> Self {
		Self::from_indexed_rows(rows.into_iter().zip(1..).map(|(row, id)| (id, row)))
	}

	/// Builds a brain from `(identifier, row)` pairs. A repeated identifier keeps the last row.
	pub fn from_indexed_rows<I: IntoIterator<Item = (i64, Row)>>(rows: I) -> Self {
		let rows: BTreeMap<i64, Row> = rows.into_iter().collect();

		let mut by_keyword: HashMap<Token, Vec<i64>> = HashMap::new();
		let mut by_successor: HashMap<Token, Vec<i64>> = HashMap::new();
		// BTreeMap iteration is ordered, so index lists come out sorted
		for (id, row) in &rows {
			by_keyword.entry(row.keyword.clone()).or_default().push(*id);
			by_successor.entry(row.chain2.clone()).or_default().push(*id);
		}

		Self { rows, by_keyword, by_successor }
	}

	/// Loads a brain from a postcard snapshot.
	///
	/// # Errors
	/// Returns an error if the file cannot be read or is not a valid snapshot.
	pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
		let snapshot: Snapshot = read_postcard(&path)?;
		debug!("loaded {} rows from {}", snapshot.rows.len(), path.as_ref().display());
		Ok(Self::from_indexed_rows(snapshot.rows))
	}

	/// Writes the brain as a postcard snapshot.
	pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
		let snapshot = Snapshot {
			rows: self.rows.iter().map(|(id, row)| (*id, row.clone())).collect(),
		};
		write_postcard(&path, &snapshot)?;
		debug!("saved {} rows to {}", snapshot.rows.len(), path.as_ref().display());
		Ok(())
	}

	fn pick(&self, ids: Option<&Vec<i64>>, rng: &mut dyn RandomSource) -> Option<Link> {
		let ids = ids.filter(|ids| !ids.is_empty())?;
		let id = ids[rng.choose_index(ids.len())];
		self.rows.get(&id).map(Row::link)
	}
}

impl AssociationStore for MemoryBrain {
	fn lookup_by_successor(&self, seed: &[u8], rng: &mut dyn RandomSource) -> Result<Option<Link>> {
		Ok(self.pick(self.by_successor.get(seed), rng))
	}

	fn lookup_by_keyword(&self, seed: &[u8], rng: &mut dyn RandomSource) -> Result<Option<Link>> {
		Ok(self.pick(self.by_keyword.get(seed), rng))
	}

	fn max_row_id(&self) -> Option<i64> {
		self.rows.keys().next_back().copied()
	}

	fn row_by_id(&self, id: i64) -> Result<Option<Link>> {
		Ok(self.rows.get(&id).map(Row::link))
	}

	fn row_at_or_after(&self, id: i64) -> Result<Option<Link>> {
		Ok(self.rows.range(id..).next().map(|(_, row)| row.link()))
	}

	fn len(&self) -> Result<usize> {
		Ok(self.rows.len())
	}
}
