//! Interactive Plotly figures written as standalone HTML pages.

pub mod bar_race;
pub mod document;
pub mod scatter;
pub mod trend;

pub use bar_race::*;
pub use document::*;
pub use scatter::*;
pub use trend::*;
