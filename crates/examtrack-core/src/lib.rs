//! examtrack-core — Exam scoring and progress aggregation engine.
//!
//! This crate turns raw correct/incorrect counts into nets and placement
//! scores, groups exam records and practice logs into calendar buckets, and
//! derives the target classification and accuracy series a dashboard shows.
//! Every operation is a pure function over its inputs.

pub mod aggregate;
pub mod bucket;
pub mod classify;
pub mod error;
pub mod filter;
pub mod ingest;
pub mod logbook;
pub mod model;
pub mod net;
pub mod report;
pub mod scoring;
pub mod statistics;
pub mod trend;

pub use error::EngineError;
