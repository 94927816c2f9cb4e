//! # epitrend data
//!
//! The Observation Table and the first three pipeline stages:
//! loading, preprocessing and analysis.
//!
//! Every stage takes the table produced by the previous one; nothing reads
//! back from a later stage.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod analyzer;
pub mod loader;
pub mod preprocessor;
pub mod schema;
pub mod table;
pub mod writer;

pub use analyzer::*;
pub use loader::*;
pub use preprocessor::*;
pub use schema::*;
pub use table::*;
pub use writer::*;
