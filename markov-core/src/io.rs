use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::Result;

/// Extension appended to a brain file name to form its snapshot.
pub(crate) const SNAPSHOT_EXTENSION: &str = "bin";

/// Builds the snapshot path of a brain: same folder, full file name plus `.bin`.
///
/// The extension is appended, never swapped, so the snapshot cannot be the
/// brain itself.
///
/// Examples:
/// - `data/brain.db` → `data/brain.db.bin`
/// - `data/brain.bin` → `data/brain.bin.bin`
pub(crate) fn snapshot_path<P: AsRef<Path>>(brain_path: P) -> std::io::Result<PathBuf> {
	let brain_path = brain_path.as_ref();

	let file_name = brain_path.file_name().ok_or_else(|| {
		std::io::Error::new(std::io::ErrorKind::InvalidInput, "Brain path has no filename")
	})?;

	let mut snapshot_name = OsString::from(file_name);
	snapshot_name.push(".");
	snapshot_name.push(SNAPSHOT_EXTENSION);

	Ok(brain_path.with_file_name(snapshot_name))
}

/// Extracts the brain name (file stem), used in log lines.
///
/// Examples:
/// - `"./data/brain.db"` → `"brain"`
/// - `"brain"` → `"brain"`
pub(crate) fn brain_name<P: AsRef<Path>>(brain_path: P) -> String {
	brain_path
		.as_ref()
		.file_stem()
		.map(|stem| stem.to_string_lossy().to_string())
		.unwrap_or_default()
}

/// Reads and decodes a postcard file.
pub(crate) fn read_postcard<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T> {
	let bytes = fs::read(path)?;
	Ok(postcard::from_bytes(&bytes)?)
}

/// Encodes `value` with postcard and writes it, replacing any previous file.
pub(crate) fn write_postcard<T: Serialize, P: AsRef<Path>>(path: P, value: &T) -> Result<()> {
	let bytes = postcard::to_stdvec(value)?;
	fs::write(path, bytes)?;
	Ok(())
}
