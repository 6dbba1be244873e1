//! Markov-chain sentence generation over a precomputed word-association table.
//!
//! This crate provides:
//! - Read-only access to an association table ("brain"), backed by SQLite
//!   or by an in-memory snapshot
//! - A two-phase chain walker (backward then forward) producing bounded sentences
//! - Injectable randomness for reproducible generation
//! - IRC rendering of generated sentences, including CTCP ACTION splitting
//!
//! Building or training the table is out of scope: the brain is consumed as-is.

/// Association table access (`AssociationStore`) and its backends.
pub mod brain;

/// Error types shared by every layer.
pub mod error;

/// IRC record parsing, `PRIVMSG` rendering and the stdin/stdout driver.
pub mod irc;

/// Substitutable random number source.
pub mod random;

/// The chain walker turning a seed word into a sentence.
pub mod walker;

/// Path helpers for brain files and snapshots.
///
/// Not exposed
pub(crate) mod io;
