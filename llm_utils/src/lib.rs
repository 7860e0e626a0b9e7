//! # llm_utils: text tools for controlled-vocabulary prompting
//!
//! The llm_utils crate is a workspace member of the llm_annotator project. It holds the
//! pieces that turn a target vocabulary into something an LLM can be asked about, and turn
//! the LLM's free text back into vocabulary members:
//!
//! * [`canonicalize`] and [`CanonicalTargetMap`] for exact, spelling-drift tolerant matching
//! * [`chunk`] for splitting a vocabulary into prompt-sized groups
//! * [`TextConcatenator`] for joining labels into a single prompt line

pub mod canonical;
pub mod chunking;
pub mod concatenator;

pub use canonical::{canonicalize, CanonicalError, CanonicalTargetMap};
pub use chunking::{chunk, join_targets, ChunkError};
pub use concatenator::TextConcatenator;
