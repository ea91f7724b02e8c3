//! PNG chart rendering for batch summaries.

pub mod font;
pub mod pie;

pub use pie::{PieChart, PieSlice};
