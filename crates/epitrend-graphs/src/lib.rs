//! # epitrend graphs
//!
//! Chart rendering for the epitrend pipeline.
//!
//! Static charts are drawn with plotters onto a bitmap backend and saved as
//! PNG. Interactive charts are Plotly figures serialized as JSON and
//! embedded in a standalone HTML page.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod heatmap;
pub mod interactive;
pub mod manager;
pub mod palette;
pub mod top_entities;
pub mod traits;
pub mod trend;
pub mod types;
pub mod utils;

#[cfg(test)]
mod test_support;

pub use heatmap::*;
pub use interactive::*;
pub use manager::*;
pub use palette::*;
pub use top_entities::*;
pub use traits::*;
pub use trend::*;
pub use types::*;
pub use utils::*;
