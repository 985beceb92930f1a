//! # seqpop - nucleotide sequence helpers for editors
//!
//! Small sequence utilities an editor can call on a selection, plus pairwise
//! alignment through an external aligner.
//!
//! ## Architecture
//!
//! - `sequence`: transcription, reverse complement, length, GC content
//! - `session`: query/subject slots for pairwise comparison
//! - `align`: `AlignmentBackend` trait and the external-process backend
//! - `host`: selection joining, search-pattern escaping, display surfaces
//! - `model`, `event`, `ui`, `controller`: the terminal result popup

pub mod align;
pub mod controller;
pub mod event;
pub mod host;
pub mod model;
pub mod sequence;
pub mod session;
pub mod ui;
