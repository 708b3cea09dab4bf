//! Transcript ingestion building blocks.
//!
//! Normalization and fingerprinting detect content changes, the chunker turns
//! one transcript into indexable pieces, and the record store remembers which
//! content version was last indexed per (video, language).

mod chunker;
mod normalize;
mod records;

pub use chunker::split_text;
pub use normalize::{fingerprint, normalize_text};
pub use records::{IngestionRecord, IngestionStore, SqliteIngestionStore};
