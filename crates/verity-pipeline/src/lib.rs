//! Verity Classification Pipeline
//!
//! Orchestrates classification with a cascading fallback so that a call
//! always returns a usable result:
//!
//! 1. generative attempt at the requested depth;
//! 2. for deep requests, one generative retry at quick depth;
//! 3. the keyword heuristic, which cannot fail.
//!
//! The worst case is a low-fidelity heuristic answer whose metadata marks
//! its provenance - never an error surfaced to the caller.

#![warn(missing_docs)]

pub mod heuristic;
pub mod pipeline;

pub use heuristic::HeuristicClassifier;
pub use pipeline::ClassificationPipeline;
