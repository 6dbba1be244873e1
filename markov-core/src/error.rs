use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while opening or querying a brain.
///
/// A lookup that finds nothing is not an error: every lookup returns
/// `Ok(None)` in that case and the walker decides what to do.
#[derive(Error, Debug)]
pub enum BrainError {
	/// The brain path does not exist. Fatal at startup.
	#[error("brain not found: '{path}'")]
	NotFound { path: PathBuf },

	/// A random row was required but the table holds no rows.
	#[error("brain has no rows")]
	EmptyStore,

	#[error("sqlite error: {0}")]
	Sqlite(#[from] rusqlite::Error),

	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),

	/// The postcard snapshot could not be encoded or decoded.
	#[error("snapshot error: {0}")]
	Snapshot(#[from] postcard::Error),
}

pub type Result<T> = std::result::Result<T, BrainError>;
