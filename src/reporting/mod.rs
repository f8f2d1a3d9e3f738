//! Charts and summaries of a finished experiment
//!
//! Builders turn pipeline artifacts into [`ChartSpec`] values; renderers
//! consume them. The SVG renderer needs the `svg` feature.

pub mod builder;
pub mod charts;
pub mod render;

pub use builder::{
    category_bars, class_boxplots, correlation_heatmap, descriptive_charts, importance_chart,
    outcome_distribution, pdp_chart, roc_chart, tuning_chart, ComparisonReport, ModelComparison,
};
pub use charts::{Bar, BoxStats, ChartSpec, Series, StackSegment};
pub use render::{ChartRenderer, TextRenderer};

#[cfg(feature = "svg")]
pub use render::SvgRenderer;
