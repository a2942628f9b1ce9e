//! Matrix Runner
//!
//! Runs every job of a matrix, sequentially and blocking:
//!
//! ```text
//! reset
//! for job in matrix (operation → payload type → mechanism)
//!     repeat N times
//!         run program → parse µs → reset
//!     mean (integer division) → results[label]
//! ```
//!
//! There is no retry: the first spawn failure or malformed timing aborts the
//! run and nothing is saved.

use indicatif::{ProgressBar, ProgressStyle};
use matrixbench_core::{
    BenchProcess, Job, Matrix, ProcessError, Reset, ResultsMap, integer_mean,
};
use matrixbench_report::{StoreError, save_results};
use std::path::Path;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Errors that abort a run
#[derive(Debug, Error)]
pub enum RunError {
    #[error("repetitions must be at least 1")]
    ZeroRepetitions,

    #[error("Job '{label}' failed: {source}")]
    Job {
        label: String,
        #[source]
        source: ProcessError,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Samples and mean for one job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobOutcome {
    /// The job
    pub job: Job,
    /// Elapsed microseconds, one per repetition
    pub samples: Vec<u64>,
    /// Integer mean of `samples`
    pub mean_us: u64,
}

/// Everything a run produced
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Per-job samples, in run order
    pub outcomes: Vec<JobOutcome>,
    /// Means keyed by job label
    pub results: ResultsMap,
    /// Wall-clock time for the whole run
    pub duration: Duration,
}

/// Runs a matrix against a benchmark process
pub struct MatrixRunner<P, R> {
    process: P,
    reset: R,
    repetitions: usize,
    show_progress: bool,
}

impl<P: BenchProcess, R: Reset> MatrixRunner<P, R> {
    /// Create a runner taking `repetitions` samples per job
    pub fn new(process: P, reset: R, repetitions: usize) -> Self {
        Self {
            process,
            reset,
            repetitions,
            show_progress: false,
        }
    }

    /// Show a progress bar on stderr while running
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Run every job in `matrix`
    pub fn run(&mut self, matrix: &Matrix) -> Result<RunSummary, RunError> {
        if self.repetitions == 0 {
            return Err(RunError::ZeroRepetitions);
        }

        let start = Instant::now();
        let pb = self.progress_bar(matrix.len());

        self.reset.reset();

        let mut outcomes = Vec::with_capacity(matrix.len());
        let mut results = ResultsMap::new();

        for job in matrix.jobs() {
            pb.set_message(job.label());
            let outcome = self.run_job(job)?;
            results.insert(outcome.job.label(), outcome.mean_us);
            outcomes.push(outcome);
            pb.inc(1);
        }

        pb.finish_with_message("Complete");

        Ok(RunSummary {
            outcomes,
            results,
            duration: start.elapsed(),
        })
    }

    /// Run every job in `matrix` and save the means to `path`
    pub fn run_and_save(
        &mut self,
        matrix: &Matrix,
        path: impl AsRef<Path>,
    ) -> Result<RunSummary, RunError> {
        let summary = self.run(matrix)?;
        save_results(path.as_ref(), &summary.results)?;
        tracing::info!(
            path = %path.as_ref().display(),
            jobs = summary.results.len(),
            "results saved"
        );
        Ok(summary)
    }

    fn run_job(&mut self, job: Job) -> Result<JobOutcome, RunError> {
        let label = job.label();
        tracing::info!("Running {}", label);

        let mut samples = Vec::with_capacity(self.repetitions);
        for _ in 0..self.repetitions {
            let elapsed = self
                .process
                .run(&job.args())
                .and_then(|out| out.elapsed_micros())
                .map_err(|source| RunError::Job {
                    label: label.clone(),
                    source,
                })?;
            tracing::debug!("{} us", elapsed);

            samples.push(elapsed);
            self.reset.reset();
        }

        let mean_us = integer_mean(&samples).ok_or(RunError::ZeroRepetitions)?;
        tracing::info!("Average: {} us", mean_us);

        Ok(JobOutcome {
            job,
            samples,
            mean_us,
        })
    }

    fn progress_bar(&self, len: usize) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(len as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
                )
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        pb
    }
}

/// One line per job: label, mean and the individual samples
pub fn format_run_summary(summary: &RunSummary) -> String {
    let width = summary
        .outcomes
        .iter()
        .map(|o| o.job.label().len())
        .max()
        .unwrap_or(0);

    let mut output = String::new();
    for outcome in &summary.outcomes {
        let samples: Vec<String> = outcome.samples.iter().map(|s| s.to_string()).collect();
        output.push_str(&format!(
            "  {:<width$}  {:>10} us  [{}]\n",
            outcome.job.label(),
            outcome.mean_us,
            samples.join(", "),
            width = width
        ));
    }
    output.push_str(&format!(
        "  {} jobs in {:.2} s\n",
        summary.outcomes.len(),
        summary.duration.as_secs_f64()
    ));
    output
}
