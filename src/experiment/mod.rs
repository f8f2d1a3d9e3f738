//! Experiment orchestration
//!
//! Stages run in a fixed linear order and hand explicit values to each other:
//! load, describe, split, tune both model families, evaluate, explain, report.

mod config;
mod runner;

pub use config::{Background, ExperimentConfig};
pub use runner::{Experiment, ExperimentReport, ModelReport};
