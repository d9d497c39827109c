//! Charts module - Chart rendering

mod plotter;
mod renderer;

pub use plotter::{ChartData, ChartPlotter, PALETTE};
pub use renderer::{RenderError, StaticChartRenderer};
