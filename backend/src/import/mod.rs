//! The delimited-text import pipeline.
//!
//! ```text
//! detect ─▶ tokenize ─▶ headers ─▶ mapper ─▶ builder ─▶ executor
//! ```
//!
//! Each stage only depends on the ones before it. [`session::ImportSession`]
//! drives them in order and enforces the session state machine; everything
//! except the executor's final write is pure.

pub mod builder;
pub mod detect;
pub mod executor;
pub mod headers;
pub mod keywords;
pub mod mapper;
pub mod session;
pub mod tokenize;

pub use session::{CommitOptions, ImportSession};
