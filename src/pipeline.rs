// src/pipeline.rs

use std::{
    fmt,
    path::PathBuf,
    time::{Duration, Instant},
};
use tracing::{error, info};

use crate::aggregate::detect_binge_watching_patterns;
use crate::config::PipelineConfig;
use crate::engine::LocalEngine;
use crate::error::Result;
use crate::load::load_ratings;
use crate::write::write_output;

/// Run stages. Strictly `Loading → Aggregating → Writing → Done`;
/// any error moves to `Failed` and nothing after it runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Loading,
    Aggregating,
    Writing,
    Done,
    Failed,
}

impl Stage {
    /// Stage after a successful step. Terminal stages stay put.
    pub fn next(self) -> Stage {
        match self {
            Stage::Loading => Stage::Aggregating,
            Stage::Aggregating => Stage::Writing,
            Stage::Writing => Stage::Done,
            Stage::Done => Stage::Done,
            Stage::Failed => Stage::Failed,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Loading => "loading",
            Stage::Aggregating => "aggregating",
            Stage::Writing => "writing",
            Stage::Done => "done",
            Stage::Failed => "failed",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub input_rows: usize,
    pub age_groups: usize,
    pub output: PathBuf,
    pub elapsed: Duration,
}

struct Run {
    stage: Stage,
}

impl Run {
    fn step<T>(&mut self, result: Result<T>) -> Result<T> {
        match result {
            Ok(value) => {
                let next = self.stage.next();
                info!(from = %self.stage, to = %next, "stage complete");
                self.stage = next;
                Ok(value)
            }
            Err(e) => {
                error!(stage = %self.stage, error = %e, "run failed");
                self.stage = Stage::Failed;
                Err(e)
            }
        }
    }
}

/// Start a local engine, run the whole pipeline on it, stop the engine.
pub fn run(config: &PipelineConfig) -> Result<RunSummary> {
    let session = LocalEngine::start(config.engine.clone())?;
    run_with(session.engine(), config)
}

/// Load, aggregate and write using an already running engine.
pub fn run_with(engine: &LocalEngine, config: &PipelineConfig) -> Result<RunSummary> {
    let start = Instant::now();
    let mut run = Run {
        stage: Stage::Loading,
    };

    let ratings = run.step(load_ratings(engine, &config.input))?;
    let mut result = run.step(detect_binge_watching_patterns(&ratings))?;
    run.step(write_output(engine, &mut result, &config.output))?;

    let summary = RunSummary {
        input_rows: ratings.height(),
        age_groups: result.height(),
        output: config.output.clone(),
        elapsed: start.elapsed(),
    };
    info!(
        stage = %run.stage,
        input_rows = summary.input_rows,
        age_groups = summary.age_groups,
        elapsed = ?summary.elapsed,
        "pipeline finished"
    );
    Ok(summary)
}
