//! Renderer-independent chart descriptions

use serde::{Deserialize, Serialize};

/// One labelled bar, with an optional error whisker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub label: String,
    pub value: f64,
    pub error: Option<f64>,
}

impl Bar {
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value,
            error: None,
        }
    }

    pub fn with_error(mut self, error: f64) -> Self {
        self.error = Some(error);
        self
    }
}

/// Values of one stack segment across every category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackSegment {
    pub name: String,
    pub values: Vec<f64>,
}

/// Five-number summary drawn as a box
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxStats {
    pub label: String,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub name: String,
    pub points: Vec<(f64, f64)>,
}

/// Chart kinds the pipeline emits.
///
/// These are plain data: the pipeline builds them and never reads them back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChartSpec {
    Heatmap {
        title: String,
        labels: Vec<String>,
        /// Row-major, `labels.len()` square
        values: Vec<Vec<f64>>,
    },
    Bar {
        title: String,
        y_label: String,
        bars: Vec<Bar>,
    },
    StackedBar {
        title: String,
        categories: Vec<String>,
        segments: Vec<StackSegment>,
    },
    BoxPlot {
        title: String,
        y_label: String,
        boxes: Vec<BoxStats>,
    },
    Lines {
        title: String,
        x_label: String,
        y_label: String,
        series: Vec<Series>,
        /// Draw the y = x reference line (ROC charts)
        diagonal: bool,
    },
}

impl ChartSpec {
    pub fn title(&self) -> &str {
        match self {
            ChartSpec::Heatmap { title, .. }
            | ChartSpec::Bar { title, .. }
            | ChartSpec::StackedBar { title, .. }
            | ChartSpec::BoxPlot { title, .. }
            | ChartSpec::Lines { title, .. } => title,
        }
    }

    /// Short name of the chart kind, also used in file names
    pub fn kind(&self) -> &'static str {
        match self {
            ChartSpec::Heatmap { .. } => "heatmap",
            ChartSpec::Bar { .. } => "bar",
            ChartSpec::StackedBar { .. } => "stacked_bar",
            ChartSpec::BoxPlot { .. } => "boxplot",
            ChartSpec::Lines { .. } => "lines",
        }
    }

    /// File-system friendly form of the title
    pub fn slug(&self) -> String {
        let mut slug = String::new();
        for c in self.title().chars() {
            if c.is_ascii_alphanumeric() {
                slug.push(c.to_ascii_lowercase());
            } else if !slug.ends_with('_') && !slug.is_empty() {
                slug.push('_');
            }
        }
        slug.trim_end_matches('_').to_string()
    }
}
