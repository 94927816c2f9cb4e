//! # epitrend
//!
//! Epidemiological reporting pipeline: loads an Our World in Data style
//! dataset, cleans it, derives rolling averages, coverage, correlations and
//! peaks, then renders static PNG charts and interactive Plotly documents.
//!
//! The binary runs the fixed pipeline; this library exposes the same run for
//! tests and embedding.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod pipeline;

pub use error::*;
pub use pipeline::*;
