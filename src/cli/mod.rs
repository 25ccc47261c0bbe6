//! Command-line interface
//!
//! Runs single stages, the whole pipeline with retries, or the daily loop.

use clap::{Parser, Subcommand};
use colored::*;
use std::path::PathBuf;

use crate::config::PipelineConfig;
use crate::orchestrator::{Pipeline, PipelineRun, TaskState};
use crate::preprocessing::ScaleFit;
use crate::stages::{self, EvaluateStage, LoadStage, PreprocessStage, Stage, TrainStage};
use crate::utils::Timer;

// ─── Styling helpers ───────────────────────────────────────────────────────────

fn dim(s: &str) -> ColoredString { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString { s.truecolor(100, 210, 120) }
fn bad(s: &str) -> ColoredString { s.truecolor(235, 100, 100) }

fn kv(key: &str, val: &str) -> String {
    format!("{} {}", muted(key), val.white())
}

fn step_run(msg: &str) {
    println!("  {} {}...", accent("›"), msg);
}

fn step_ok(msg: &str, detail: &str) {
    println!("  {} {} {}", ok("✓"), msg, dim(detail));
}

fn step_failed(msg: &str, detail: &str) {
    println!("  {} {} {}", bad("✗"), msg, dim(detail));
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "diagnostic-pipeline")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Batch training pipeline for the diagnostic breast cancer dataset")]
#[command(long_about = None)]
pub struct Cli {
    /// Root of the data/, results/ and logs/ directories
    #[arg(long, global = true)]
    pub base_dir: Option<PathBuf>,

    /// JSON configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Fit the scaler on the full dataset instead of the training rows
    #[arg(long, global = true)]
    pub full_dataset_scaling: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch the dataset and write the raw table
    Load,

    /// Impute, scale and split the raw table
    Preprocess,

    /// Fit the model on the training partition
    Train,

    /// Score the model on the test partition
    Evaluate,

    /// Run all four stages with retries
    Run,

    /// Run the pipeline every day at the configured time
    Schedule,

    /// Print the effective configuration as JSON
    ShowConfig,
}

impl Cli {
    /// Defaults, then the config file, then command-line overrides
    pub fn pipeline_config(&self) -> anyhow::Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::from_file(path)?,
            None => PipelineConfig::default(),
        };
        if let Some(base) = &self.base_dir {
            config = config.with_base_dir(base);
        }
        if self.full_dataset_scaling {
            config.preprocessing.scale_fit = ScaleFit::FullDataset;
        }
        config.validate()?;
        Ok(config)
    }
}

// ─── Commands ──────────────────────────────────────────────────────────────────

/// Run a single stage once, without retries
pub fn cmd_stage(config: &PipelineConfig, command: &Commands) -> anyhow::Result<()> {
    config.paths.ensure_dirs()?;
    let stage: Box<dyn Stage> = match command {
        Commands::Load => Box::new(LoadStage::new(config)),
        Commands::Preprocess => Box::new(PreprocessStage::new(config)),
        Commands::Train => Box::new(TrainStage::new(config)),
        Commands::Evaluate => Box::new(EvaluateStage::new(config)),
        _ => anyhow::bail!("not a single-stage command"),
    };

    step_run(stage.name());
    let timer = Timer::start();
    match stages::run_logged(stage.as_ref()) {
        Ok(artifact) => {
            step_ok(stage.name(), &format!("{} ({} ms)", artifact.summary, timer.elapsed_ms()));
            for path in &artifact.outputs {
                println!("    {}", kv("wrote", &path.display().to_string()));
            }
            Ok(())
        }
        Err(err) => {
            step_failed(stage.name(), &err.kind().to_string());
            Err(err.into())
        }
    }
}

/// Run the full pipeline once
pub async fn cmd_run(config: &PipelineConfig) -> anyhow::Result<()> {
    config.paths.ensure_dirs()?;
    let pipeline = Pipeline::from_config(config);

    section(&format!("Pipeline {}", pipeline.dag_id()));
    let run = pipeline.run().await;
    print_run(&run);

    match run.failed_task() {
        None => Ok(()),
        Some(task) => anyhow::bail!(
            "task {} failed after {} attempt(s)",
            task.task_id,
            task.attempts
        ),
    }
}

/// Run the pipeline daily, forever
pub async fn cmd_schedule(config: &PipelineConfig) -> anyhow::Result<()> {
    config.paths.ensure_dirs()?;
    let schedule = config.orchestration.schedule;
    let pipeline = Pipeline::from_config(config);

    section(&format!("Scheduling {}", pipeline.dag_id()));
    println!("  {}", kv("cron", &schedule.cron()));
    println!("  {}", kv("tasks", &pipeline.task_ids().join(" → ")));

    pipeline.run_daily(schedule).await?;
    Ok(())
}

pub fn cmd_show_config(config: &PipelineConfig) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}

fn print_run(run: &PipelineRun) {
    for task in &run.tasks {
        let detail = format!("{} attempt(s), {} ms", task.attempts, task.duration_ms);
        match task.state {
            TaskState::Success => step_ok(&task.task_id, &detail),
            TaskState::Failed => {
                let reason = task
                    .error
                    .as_ref()
                    .map(|f| format!("{}: {}", f.kind, f.message))
                    .unwrap_or_default();
                step_failed(&task.task_id, &format!("{} {}", detail, reason));
            }
            TaskState::UpstreamFailed => {
                println!("  {} {} {}", dim("-"), muted(&task.task_id), dim("upstream failed"));
            }
        }
    }
    println!();
    println!("  {}", kv("run", &run.run_id.to_string()));
    let state = if run.is_success() { ok("success") } else { bad("failed") };
    println!("  {} {}", muted("state"), state);
}
