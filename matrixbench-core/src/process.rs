//! External Benchmark Process
//!
//! The benchmarked program is a black box: it receives
//! `<operation> <mechanism> <payload-type>` and prints the elapsed time in
//! microseconds on stdout. `BenchProcess` is the seam between the runner and
//! that program so tests can feed crafted output instead of spawning.

use std::path::PathBuf;
use std::process::{Command, Stdio};
use thiserror::Error;

/// Errors from invoking the benchmark program or reading its output
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("Failed to spawn {program}: {source}")]
    SpawnFailed {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Benchmark output is not a number of microseconds: {output:?}")]
    InvalidOutput { output: String },
}

/// Captured result of one benchmark invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawOutput {
    /// Everything the program wrote to stdout
    pub stdout: String,
    /// Exit code, `None` if killed by a signal or not applicable
    pub exit_code: Option<i32>,
}

impl RawOutput {
    /// Output from a successful run
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            exit_code: Some(0),
        }
    }

    /// Whether the program exited cleanly
    pub fn succeeded(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Parse the reported elapsed time
    pub fn elapsed_micros(&self) -> Result<u64, ProcessError> {
        parse_elapsed_micros(&self.stdout)
    }
}

/// Capability to run the benchmark program once
pub trait BenchProcess {
    /// Run with the given trailing arguments and wait for it to exit
    fn run(&mut self, args: &[&str]) -> Result<RawOutput, ProcessError>;
}

impl<P: BenchProcess + ?Sized> BenchProcess for &mut P {
    fn run(&mut self, args: &[&str]) -> Result<RawOutput, ProcessError> {
        (**self).run(args)
    }
}

/// Parse benchmark output: a non-negative integer, optionally followed by
/// other text after whitespace.
pub fn parse_elapsed_micros(output: &str) -> Result<u64, ProcessError> {
    output
        .split_whitespace()
        .next()
        .and_then(|token| token.parse::<u64>().ok())
        .ok_or_else(|| ProcessError::InvalidOutput {
            output: output.to_string(),
        })
}

/// Runs a real program, e.g. `dotnet run Benchmarks <args>`
#[derive(Debug, Clone)]
pub struct CommandProcess {
    program: String,
    leading_args: Vec<String>,
    working_dir: Option<PathBuf>,
}

impl CommandProcess {
    /// Create a process runner for `program`
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            leading_args: Vec::new(),
            working_dir: None,
        }
    }

    /// Arguments placed before the job arguments
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.leading_args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Directory to run the program in
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Full command line for the given job arguments, for display
    pub fn command_line(&self, args: &[&str]) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.leading_args.iter().map(String::as_str))
            .chain(args.iter().copied())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl BenchProcess for CommandProcess {
    fn run(&mut self, args: &[&str]) -> Result<RawOutput, ProcessError> {
        let mut command = Command::new(&self.program);
        command
            .args(&self.leading_args)
            .args(args)
            .stdin(Stdio::null())
            .stderr(Stdio::inherit());
        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }

        tracing::debug!(command = %self.command_line(args), "spawning benchmark");

        let output = command.output().map_err(|source| ProcessError::SpawnFailed {
            program: self.program.clone(),
            source,
        })?;

        let raw = RawOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            exit_code: output.status.code(),
        };
        if !raw.succeeded() {
            tracing::warn!(
                command = %self.command_line(args),
                status = %output.status,
                "benchmark program exited unsuccessfully"
            );
        }
        Ok(raw)
    }
}
