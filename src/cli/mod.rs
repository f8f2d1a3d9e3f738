//! clinical-ml CLI Module
//!
//! Command-line interface for running the full experiment or only the
//! exploratory statistics.

use clap::{Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::analysis::describe;
use crate::data::DataLoader;
use crate::experiment::{Experiment, ExperimentConfig, ExperimentReport, ModelReport};
use crate::reporting::{descriptive_charts, ChartRenderer, TextRenderer};

// ─── Styling helpers ───────────────────────────────────────────────────────────

const W: usize = 58; // box inner width

fn dim(s: &str) -> ColoredString   { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }
fn warn(s: &str) -> ColoredString   { s.truecolor(230, 180, 80) }

fn line_box_top()    { println!("  {}", dim("┌─────────────────────────────────────────────────────────┐")); }
fn line_box_bottom() { println!("  {}", dim("└─────────────────────────────────────────────────────────┘")); }
fn line_box_sep()    { println!("  {}", dim("├─────────────────────────────────────────────────────────┤")); }

fn line_box(content: &str) {
    let visible_len = strip_ansi(content).chars().count();
    let pad = W.saturating_sub(visible_len);
    println!("  {}  {}{} {}", dim("│"), content, " ".repeat(pad), dim("│"));
}

fn strip_ansi(s: &str) -> String {
    let mut out = String::new();
    let mut in_escape = false;
    for c in s.chars() {
        if c == '\x1b' { in_escape = true; continue; }
        if in_escape { if c == 'm' { in_escape = false; } continue; }
        out.push(c);
    }
    out
}

fn kv(key: &str, val: &str) -> String {
    format!("{} {}", muted(key), val.white())
}

fn step_ok(msg: &str) {
    println!("  {} {}", ok("✓"), msg);
}

fn step_run(msg: &str) {
    print!("  {} {}... ", accent("›"), msg);
}

fn step_done(detail: &str) {
    println!("{} {}", ok("done"), dim(detail));
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

/// Print a rendered chart indented under the current section
fn print_chart(text: &str) {
    println!();
    for line in text.lines() {
        println!("  {}", line);
    }
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "clinical-ml")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Binary-classification experiments on clinical tabular data")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Describe, tune, evaluate and explain both model families
    Run {
        /// Input CSV file
        #[arg(short, long)]
        data: PathBuf,

        /// JSON experiment configuration
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Seed overriding the configuration
        #[arg(long)]
        seed: Option<u64>,

        /// Threads for grid search (defaults to all cores)
        #[arg(long)]
        n_jobs: Option<usize>,

        /// Directory for SVG charts (requires the `svg` feature)
        #[arg(long)]
        svg_dir: Option<PathBuf>,
    },

    /// Print summary statistics and exploratory charts only
    Describe {
        /// Input CSV file
        #[arg(short, long)]
        data: PathBuf,

        /// JSON experiment configuration (for a custom schema)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

// ─── Configuration ─────────────────────────────────────────────────────────────

pub fn load_config(path: Option<&Path>) -> anyhow::Result<ExperimentConfig> {
    match path {
        Some(p) => Ok(ExperimentConfig::from_json_file(p)?),
        None => Ok(ExperimentConfig::default()),
    }
}

// ─── Commands ──────────────────────────────────────────────────────────────────

pub fn cmd_describe(data_path: &Path, config_path: Option<&Path>) -> anyhow::Result<()> {
    section("Describe");

    let config = load_config(config_path)?;
    step_run("Loading data");
    let start = Instant::now();
    let data = DataLoader::new(config.schema.clone()).load_csv(data_path)?;
    step_done(&format!("{} rows × {} predictors in {:?}", data.n_rows(), data.schema().n_predictors(), start.elapsed()));

    let report = describe(&data);

    println!();
    println!(
        "  {:<26} {:>9} {:>9} {:>9} {:>9} {:>9}",
        muted("Column"), muted("Mean"), muted("Std"), muted("Min"), muted("Median"), muted("Max")
    );
    println!("  {}", dim(&"─".repeat(76)));
    for s in &report.summaries {
        println!(
            "  {:<26} {:>9.2} {:>9.2} {:>9.2} {:>9.2} {:>9.2}",
            s.name, s.mean, s.std, s.min, s.median, s.max
        );
    }

    let renderer = TextRenderer::new();
    for chart in descriptive_charts(&report, &config.schema.outcome) {
        print_chart(&renderer.render(&chart)?);
    }
    println!();
    Ok(())
}

pub fn cmd_run(
    data_path: &Path,
    config_path: Option<&Path>,
    seed: Option<u64>,
    n_jobs: Option<usize>,
    svg_dir: Option<&Path>,
) -> anyhow::Result<()> {
    section("Run");

    let mut config = load_config(config_path)?;
    if let Some(seed) = seed {
        config = config.with_seed(seed);
    }
    if let Some(n) = n_jobs {
        config = config.with_n_jobs(n);
    }

    step_run("Loading data");
    let start = Instant::now();
    let data = DataLoader::new(config.schema.clone()).load_csv(data_path)?;
    step_done(&format!("{} rows in {:?}", data.n_rows(), start.elapsed()));

    println!("  {}", kv("Seed        ", &config.seed.to_string()));
    println!("  {}", kv("Folds       ", &config.n_folds.to_string()));
    println!("  {}", kv("Train share ", &format!("{:.0}%", config.train_fraction * 100.0)));
    println!(
        "  {}",
        kv("Grid        ", &format!("{} logistic, {} forest", config.logistic().len(), config.forest().len()))
    );

    step_run("Running experiment");
    let start = Instant::now();
    let report = Experiment::new(config).run(&data)?;
    step_done(&format!("{:?}", start.elapsed()));

    for model in report.models() {
        print_model(model);
    }

    section("Charts");
    let renderer = TextRenderer::new();
    let charts = report.charts();
    for chart in &charts {
        print_chart(&renderer.render(chart)?);
    }

    if let Some(dir) = svg_dir {
        write_svg(&charts, dir)?;
    }

    print_comparison(&report);
    Ok(())
}

#[cfg(feature = "svg")]
fn write_svg(charts: &[crate::reporting::ChartSpec], dir: &Path) -> anyhow::Result<()> {
    let paths = crate::reporting::SvgRenderer::new().save_all(charts, dir)?;
    println!();
    step_ok(&format!("Wrote {} SVG charts to {}", paths.len(), dir.display()));
    Ok(())
}

#[cfg(not(feature = "svg"))]
fn write_svg(_charts: &[crate::reporting::ChartSpec], dir: &Path) -> anyhow::Result<()> {
    println!();
    println!(
        "  {} {}",
        warn("!"),
        format!("SVG output skipped for {}: rebuild with --features svg", dir.display())
    );
    Ok(())
}

fn print_model(model: &ModelReport) {
    section(&format!("Model · {}", model.name));
    let best = model.tuning.best_summary();
    println!("  {:<18} {}", muted("Selected"), model.tuning.best_spec.to_string().cyan());
    println!(
        "  {:<18} {}",
        muted("CV ROC AUC"),
        format!("{:.4} ± {:.4} ({} folds)", best.mean_roc_auc, best.std_roc_auc, best.n_successful).white()
    );
    let failed = model.tuning.n_failed_trials();
    if failed > 0 {
        println!("  {:<18} {}", muted("Failed trials"), warn(&failed.to_string()));
    }
    println!("  {:<18} {}", muted("Test accuracy"), format!("{:.4}", model.evaluation.accuracy).white().bold());
    if let Some(auc) = model.evaluation.roc_auc {
        println!("  {:<18} {}", muted("Test ROC AUC"), format!("{:.4}", auc).white());
    }

    println!();
    println!("  {:<26} {:>10} {:>10}", muted("Feature"), muted("Importance"), muted("Std"));
    println!("  {}", dim(&"─".repeat(48)));
    for (name, mean, std) in model.importance.top_k(5) {
        println!("  {:<26} {:>10.4} {:>10.4}", name, mean, std);
    }
}

fn print_comparison(report: &ExperimentReport) {
    section("Comparison");
    line_box_top();
    for (i, m) in report.comparison.models.iter().enumerate() {
        if i > 0 {
            line_box_sep();
        }
        let rows = m.confusion.as_rows();
        line_box(&format!("{}", m.name.white().bold()));
        line_box(&kv("accuracy ", &format!("{:.1}%", m.accuracy * 100.0)));
        line_box(&kv("confusion", &format!("[[{}, {}], [{}, {}]]", rows[0][0], rows[0][1], rows[1][0], rows[1][1])));
    }
    line_box_sep();
    line_box(&kv("majority baseline", &format!("{:.1}%", report.comparison.majority_baseline * 100.0)));
    if let Some(best) = report.comparison.best() {
        line_box(&format!("{} {}", ok("best:"), best.name));
    }
    line_box_bottom();
    println!();
    step_ok(&format!("Finished in {:.1}s", report.elapsed_secs));
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_ansi() {
        let colored = "\x1b[38;2;1;2;3mhello\x1b[0m";
        assert_eq!(strip_ansi(colored), "hello");
    }

    #[test]
    fn test_parse_run() {
        let cli = Cli::try_parse_from([
            "clinical-ml", "run", "--data", "heart.csv", "--seed", "7", "--svg-dir", "out",
        ])
        .unwrap();
        match cli.command {
            Commands::Run { data, seed, svg_dir, config, .. } => {
                assert_eq!(data, PathBuf::from("heart.csv"));
                assert_eq!(seed, Some(7));
                assert_eq!(svg_dir, Some(PathBuf::from("out")));
                assert!(config.is_none());
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn test_parse_requires_data() {
        assert!(Cli::try_parse_from(["clinical-ml", "describe"]).is_err());
    }
}
