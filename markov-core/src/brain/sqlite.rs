//! SQLite-backed association table.
//!
//! The brain is a single table `brain(keyword, chain1, chain2)`, expected to be
//! indexed on `keyword` and on `chain2`. The file is opened read-only.

use std::path::Path;

use log::debug;
use rusqlite::types::{Type, ValueRef};
use rusqlite::{Connection, OpenFlags, OptionalExtension, params};

use super::AssociationStore;
use super::row::{Link, Row, Token};
use crate::error::{BrainError, Result};
use crate::random::RandomSource;

// ---------------------------------------------------------------------------
// SQL constants
// ---------------------------------------------------------------------------

const COUNT_BY_SUCCESSOR_SQL: &str = "SELECT COUNT(*) FROM brain WHERE chain2 = ?1";

const PICK_BY_SUCCESSOR_SQL: &str = "\
SELECT chain1, chain2 FROM brain
WHERE chain2 = ?1
ORDER BY rowid
LIMIT 1 OFFSET ?2";

const COUNT_BY_KEYWORD_SQL: &str = "SELECT COUNT(*) FROM brain WHERE keyword = ?1";

const PICK_BY_KEYWORD_SQL: &str = "\
SELECT chain1, chain2 FROM brain
WHERE keyword = ?1
ORDER BY rowid
LIMIT 1 OFFSET ?2";

const ROW_BY_ID_SQL: &str = "SELECT chain1, chain2 FROM brain WHERE rowid = ?1";

const ROW_AT_OR_AFTER_SQL: &str = "\
SELECT chain1, chain2 FROM brain
WHERE rowid >= ?1
ORDER BY rowid
LIMIT 1";

const MAX_ROW_ID_SQL: &str = "SELECT MAX(rowid) FROM brain";

const COUNT_SQL: &str = "SELECT COUNT(*) FROM brain";

const DUMP_SQL: &str = "SELECT rowid, keyword, chain1, chain2 FROM brain ORDER BY rowid";

// ---------------------------------------------------------------------------
// SqliteBrain
// ---------------------------------------------------------------------------

/// Read-only view over a SQLite brain.
///
/// Ties between matching rows are resolved by counting the matches and
/// fetching the `k`-th one (by rowid), with `k` drawn from the caller's
/// [`RandomSource`]. SQLite's own `RANDOM()` is never used, so a seeded
/// source reproduces the same rows.
///
/// The maximum rowid is read once at open time: the table never changes
/// while a brain is open.
pub struct SqliteBrain {
	conn: Connection,
	max_row_id: Option<i64>,
}

impl std::fmt::Debug for SqliteBrain {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("SqliteBrain")
			.field("max_row_id", &self.max_row_id)
			.finish_non_exhaustive()
	}
}

impl SqliteBrain {
	/// Opens the brain at `path` read-only.
	///
	/// # Errors
	/// - `BrainError::NotFound` if the file does not exist
	/// - `BrainError::Sqlite` if it is not a database or has no `brain` table
	pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
		let path = path.as_ref();
		if !path.exists() {
			return Err(BrainError::NotFound { path: path.to_path_buf() });
		}
		let conn = Connection::open_with_flags(
			path,
			OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
		)?;
		Self::from_connection(conn)
	}

	/// Wraps an already open connection (used for in-memory databases).
	pub fn from_connection(conn: Connection) -> Result<Self> {
		let max_row_id: Option<i64> = conn.query_row(MAX_ROW_ID_SQL, [], |row| row.get(0))?;
		debug!("sqlite brain opened, max rowid {:?}", max_row_id);
		Ok(Self { conn, max_row_id })
	}

	/// Reads every row with its rowid, in rowid order.
	pub fn dump(&self) -> Result<Vec<(i64, Row)>> {
		let mut stmt = self.conn.prepare(DUMP_SQL)?;
		let rows = stmt
			.query_map([], |row| {
				let id: i64 = row.get(0)?;
				let keyword = required_token(row, 1, "keyword")?;
				let chain1 = token_at(row, 2)?;
				let chain2 = required_token(row, 3, "chain2")?;
				Ok((id, Row { keyword, chain1, chain2 }))
			})?
			.collect::<rusqlite::Result<Vec<_>>>()?;
		Ok(rows)
	}

	fn pick(&self, count_sql: &str, pick_sql: &str, key: &[u8], rng: &mut dyn RandomSource) -> Result<Option<Link>> {
		let count: i64 = self
			.conn
			.prepare_cached(count_sql)?
			.query_row(params![key], |row| row.get(0))?;
		if count <= 0 {
			return Ok(None);
		}

		let offset = rng.choose_index(count as usize) as i64;
		let link = self
			.conn
			.prepare_cached(pick_sql)?
			.query_row(params![key, offset], link_from_row)
			.optional()?;
		Ok(link)
	}

	fn link_where(&self, sql: &str, id: i64) -> Result<Option<Link>> {
		let link = self
			.conn
			.prepare_cached(sql)?
			.query_row(params![id], link_from_row)
			.optional()?;
		Ok(link)
	}
}

impl AssociationStore for SqliteBrain {
	fn lookup_by_successor(&self, seed: &[u8], rng: &mut dyn RandomSource) -> Result<Option<Link>> {
		self.pick(COUNT_BY_SUCCESSOR_SQL, PICK_BY_SUCCESSOR_SQL, seed, rng)
	}

	fn lookup_by_keyword(&self, seed: &[u8], rng: &mut dyn RandomSource) -> Result<Option<Link>> {
		self.pick(COUNT_BY_KEYWORD_SQL, PICK_BY_KEYWORD_SQL, seed, rng)
	}

	fn max_row_id(&self) -> Option<i64> {
		self.max_row_id
	}

	fn row_by_id(&self, id: i64) -> Result<Option<Link>> {
		self.link_where(ROW_BY_ID_SQL, id)
	}

	fn row_at_or_after(&self, id: i64) -> Result<Option<Link>> {
		self.link_where(ROW_AT_OR_AFTER_SQL, id)
	}

	fn len(&self) -> Result<usize> {
		let count: i64 = self.conn.query_row(COUNT_SQL, [], |row| row.get(0))?;
		Ok(count.max(0) as usize)
	}
}

// ---------------------------------------------------------------------------
// Column conversion
// ---------------------------------------------------------------------------

/// Reads a column as a token. BLOB and TEXT are taken byte for byte;
/// numbers are rendered the way SQLite would print them.
fn token_at(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<Option<Token>> {
	Ok(match row.get_ref(idx)? {
		ValueRef::Null => None,
		ValueRef::Text(bytes) | ValueRef::Blob(bytes) => Some(bytes.to_vec()),
		ValueRef::Integer(value) => Some(value.to_string().into_bytes()),
		ValueRef::Real(value) => Some(value.to_string().into_bytes()),
	})
}

fn required_token(row: &rusqlite::Row<'_>, idx: usize, name: &str) -> rusqlite::Result<Token> {
	token_at(row, idx)?.ok_or_else(|| rusqlite::Error::InvalidColumnType(idx, name.to_owned(), Type::Null))
}

fn link_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Link> {
	Ok(Link {
		chain1: token_at(row, 0)?,
		chain2: required_token(row, 1, "chain2")?,
	})
}
