//! Corpus assembly stages and pipeline orchestration for mdcorpus.
//!
//! This crate ties together link discovery, scraping, markdown cleaning,
//! combining, and the final knowledge-base merge into end-to-end workflows
//! (e.g., [`pipeline::build_corpus`]).

pub mod articles;
pub mod docs;
pub mod knowledge;
pub mod pipeline;
