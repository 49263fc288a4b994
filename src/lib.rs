//! kwdash library
//!
//! This module exposes the pipeline, presenters and CLI parsing for the binary
//! and for integration tests.

pub mod app;
pub mod cache;
pub mod cli;
pub mod data;
pub mod export;
pub mod pipeline;
pub mod report;
pub mod ui;

#[cfg(test)]
mod test_support;
