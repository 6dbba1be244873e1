//! Association table ("brain") access.
//!
//! This module exposes:
//! - The row and token types (`Row`, `Link`, `Token`)
//! - The read-only query contract (`AssociationStore`)
//! - Two backends: SQLite (`SqliteBrain`) and in-memory (`MemoryBrain`)
//! - `Brain`, which opens a file and picks the backend

use std::path::Path;

use log::info;

use crate::error::{BrainError, Result};
use crate::io::{brain_name, snapshot_path};
use crate::random::RandomSource;

/// In-memory table with hash indices, loadable from a postcard snapshot.
pub mod memory;

/// Table records, tokens and the termination marker.
pub mod row;

/// Read-only SQLite table.
pub mod sqlite;

pub use memory::MemoryBrain;
pub use row::{Link, Row, TERMINATOR, Token, strip_terminator};
pub use sqlite::SqliteBrain;

/// Number of uniform identifier draws before settling on the next present row.
pub const RANDOM_ROW_DRAWS: usize = 8;

/// Read-only queries over an association table.
///
/// Every lookup returns at most one row; when several rows match, one is
/// chosen uniformly with the caller's `RandomSource`. A lookup that matches
/// nothing returns `Ok(None)`.
pub trait AssociationStore {
	/// A row whose `chain2` equals `seed` byte for byte (termination marker included).
	fn lookup_by_successor(&self, seed: &[u8], rng: &mut dyn RandomSource) -> Result<Option<Link>>;

	/// A row whose `keyword` equals `seed`.
	fn lookup_by_keyword(&self, seed: &[u8], rng: &mut dyn RandomSource) -> Result<Option<Link>>;

	/// Highest row identifier, `None` for an empty table.
	fn max_row_id(&self) -> Option<i64>;

	/// The row with identifier `id`, if that identifier is in use.
	fn row_by_id(&self, id: i64) -> Result<Option<Link>>;

	/// The row with the smallest identifier `>= id`.
	fn row_at_or_after(&self, id: i64) -> Result<Option<Link>>;

	/// Number of rows.
	fn len(&self) -> Result<usize>;

	/// A row picked by drawing identifiers uniformly in `[0, max]`.
	///
	/// Identifiers may have gaps. A draw landing on an unused identifier is a
	/// miss and is redrawn, up to [`RANDOM_ROW_DRAWS`] draws; after that the
	/// first row at or after the last draw is used, or the lowest row when
	/// identifiers are all negative and draws (never below 0) land past them.
	///
	/// # Errors
	/// `BrainError::EmptyStore` if the table has no rows.
	fn random_row(&self, rng: &mut dyn RandomSource) -> Result<Link> {
		let max = self.max_row_id().ok_or(BrainError::EmptyStore)?;

		let mut id = 0;
		for _ in 0..RANDOM_ROW_DRAWS {
			id = rng.row_id(max);
			if let Some(link) = self.row_by_id(id)? {
				return Ok(link);
			}
		}

		match self.row_at_or_after(id)? {
			Some(link) => Ok(link),
			None => self.row_at_or_after(i64::MIN)?.ok_or(BrainError::EmptyStore),
		}
	}
}

impl<T: AssociationStore + ?Sized> AssociationStore for &T {
	fn lookup_by_successor(&self, seed: &[u8], rng: &mut dyn RandomSource) -> Result<Option<Link>> {
		(**self).lookup_by_successor(seed, rng)
	}

	fn lookup_by_keyword(&self, seed: &[u8], rng: &mut dyn RandomSource) -> Result<Option<Link>> {
		(**self).lookup_by_keyword(seed, rng)
	}

	fn max_row_id(&self) -> Option<i64> {
		(**self).max_row_id()
	}

	fn row_by_id(&self, id: i64) -> Result<Option<Link>> {
		(**self).row_by_id(id)
	}

	fn row_at_or_after(&self, id: i64) -> Result<Option<Link>> {
		(**self).row_at_or_after(id)
	}

	fn len(&self) -> Result<usize> {
		(**self).len()
	}

	fn random_row(&self, rng: &mut dyn RandomSource) -> Result<Link> {
		(**self).random_row(rng)
	}
}

/// A brain opened from disk, on whichever backend it was loaded with.
#[derive(Debug)]
pub enum Brain {
	Sqlite(SqliteBrain),
	Memory(MemoryBrain),
}

impl Brain {
	/// Opens the brain at `path`.
	///
	/// - Without `cache`, the SQLite file is queried directly.
	/// - With `cache`, a postcard snapshot next to the file (file name plus `.bin`)
	///   is loaded if it exists. Otherwise the SQLite table is read once,
	///   written as that snapshot, and served from memory.
	///
	/// # Errors
	/// - `BrainError::NotFound` if `path` does not exist (even when a snapshot does)
	/// - SQLite, I/O or snapshot errors while loading
	///
	/// # Notes
	/// - A snapshot is not refreshed when the SQLite file changes; delete it to rebuild.
	pub fn open<P: AsRef<Path>>(path: P, cache: bool) -> Result<Self> {
		let path = path.as_ref();
		if !path.exists() {
			return Err(BrainError::NotFound { path: path.to_path_buf() });
		}

		if !cache {
			info!("opening brain '{}'", brain_name(path));
			return Ok(Brain::Sqlite(SqliteBrain::open(path)?));
		}

		let snapshot = snapshot_path(path)?;
		if snapshot.exists() {
			info!("loading brain '{}' from {}", brain_name(path), snapshot.display());
			return Ok(Brain::Memory(MemoryBrain::load(&snapshot)?));
		}

		let sqlite = SqliteBrain::open(path)?;
		let memory = MemoryBrain::from_indexed_rows(sqlite.dump()?);
		memory.save(&snapshot)?;
		info!("brain '{}' cached to {}", brain_name(path), snapshot.display());
		Ok(Brain::Memory(memory))
	}

	fn store(&self) -> &dyn AssociationStore {
		match self {
			Brain::Sqlite(brain) => brain,
			Brain::Memory(brain) => brain,
		}
	}
}

impl AssociationStore for Brain {
	fn lookup_by_successor(&self, seed: &[u8], rng: &mut dyn RandomSource) -> Result<Option<Link>> {
		self.store().lookup_by_successor(seed, rng)
	}

	fn lookup_by_keyword(&self, seed: &[u8], rng: &mut dyn RandomSource) -> Result<Option<Link>> {
		self.store().lookup_by_keyword(seed, rng)
	}

	fn max_row_id(&self) -> Option<i64> {
		self.store().max_row_id()
	}

	fn row_by_id(&self, id: i64) -> Result<Option<Link>> {
		self.store().row_by_id(id)
	}

	fn row_at_or_after(&self, id: i64) -> Result<Option<Link>> {
		self.store().row_at_or_after(id)
	}

	fn len(&self) -> Result<usize> {
		self.store().len()
	}
}
