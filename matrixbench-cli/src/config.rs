//! Configuration loading from matrixbench.toml
//!
//! The matrix, the program under test and the cleanup targets can be
//! specified in a `matrixbench.toml` file. The file is discovered by walking
//! up from the current directory; every section and key is optional.

use matrixbench_core::{EnvironmentReset, Matrix, MatrixError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name looked for during discovery
pub const CONFIG_FILE_NAME: &str = "matrixbench.toml";

/// Invalid configuration values
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid matrix: {0}")]
    Matrix(#[from] MatrixError),

    #[error("repetitions must be at least 1")]
    ZeroRepetitions,

    #[error("runner.program must not be empty")]
    EmptyProgram,
}

/// matrixbench configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MatrixConfig {
    /// Dimensions and baseline
    #[serde(default)]
    pub matrix: MatrixSection,
    /// Program under test
    #[serde(default)]
    pub runner: RunnerConfig,
    /// Cleanup between samples
    #[serde(default)]
    pub reset: ResetConfig,
    /// Results file and report format
    #[serde(default)]
    pub output: OutputConfig,
}

/// The `[matrix]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatrixSection {
    /// Operations passed as the first argument
    #[serde(default = "default_operations")]
    pub operations: Vec<String>,
    /// Payload types passed as the third argument
    #[serde(default = "default_payload_types")]
    pub payload_types: Vec<String>,
    /// Mechanisms passed as the second argument
    #[serde(default = "default_mechanisms")]
    pub mechanisms: Vec<String>,
    /// Mechanism that ratios are measured against
    #[serde(default = "default_baseline")]
    pub baseline: String,
}

impl Default for MatrixSection {
    fn default() -> Self {
        Self {
            operations: default_operations(),
            payload_types: default_payload_types(),
            mechanisms: default_mechanisms(),
            baseline: default_baseline(),
        }
    }
}

impl MatrixSection {
    /// Convert to the runner's matrix type
    pub fn to_matrix(&self) -> Matrix {
        Matrix {
            operations: self.operations.clone(),
            payload_types: self.payload_types.clone(),
            mechanisms: self.mechanisms.clone(),
            baseline: self.baseline.clone(),
        }
    }
}

fn strings(xs: &[&str]) -> Vec<String> {
    xs.iter().map(|s| s.to_string()).collect()
}

fn default_operations() -> Vec<String> {
    strings(&["Deserialize", "Serialize"])
}
fn default_payload_types() -> Vec<String> {
    strings(&[
        "LoginViewModel",
        "Location",
        "IndexViewModel",
        "MyEventsListerViewModel",
        "CollectionsOfPrimitives",
    ])
}
fn default_mechanisms() -> Vec<String> {
    strings(&[
        "Jil",
        "Json.NET",
        "Utf8Json",
        "Default",
        "AOT_LoadConverters",
        "AOT_Raw",
    ])
}
fn default_baseline() -> String {
    "Default".to_string()
}

/// The `[runner]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Executable to invoke
    #[serde(default = "default_program")]
    pub program: String,
    /// Arguments placed before `<operation> <mechanism> <payload-type>`
    #[serde(default = "default_args")]
    pub args: Vec<String>,
    /// Directory to run the program in (current directory if unset)
    #[serde(default)]
    pub working_dir: Option<String>,
    /// Samples per job
    #[serde(default = "default_repetitions")]
    pub repetitions: usize,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            args: default_args(),
            working_dir: None,
            repetitions: default_repetitions(),
        }
    }
}

fn default_program() -> String {
    "dotnet".to_string()
}
fn default_args() -> Vec<String> {
    strings(&["run", "Benchmarks"])
}
fn default_repetitions() -> usize {
    10
}

/// The `[reset]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetConfig {
    /// Build output directories deleted before every sample
    #[serde(default = "default_directories")]
    pub directories: Vec<String>,
    /// Process name killed before every sample (empty to disable)
    #[serde(default = "default_process")]
    pub process: Option<String>,
}

impl Default for ResetConfig {
    fn default() -> Self {
        Self {
            directories: default_directories(),
            process: default_process(),
        }
    }
}

impl ResetConfig {
    /// Build the reset hook, resolving directories against `working_dir`
    pub fn to_reset(&self, working_dir: Option<&Path>) -> EnvironmentReset {
        let dirs = self.directories.iter().map(|d| match working_dir {
            Some(base) => base.join(d),
            None => PathBuf::from(d),
        });
        EnvironmentReset::new(dirs, self.process.clone())
    }
}

fn default_directories() -> Vec<String> {
    strings(&["bin", "obj"])
}
fn default_process() -> Option<String> {
    Some("dotnet".to_string())
}

/// The `[output]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// JSON file results are saved to and loaded from
    #[serde(default = "default_results_path")]
    pub results_path: String,
    /// Report format: "table", "json" or "csv"
    #[serde(default = "default_format")]
    pub format: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            results_path: default_results_path(),
            format: default_format(),
        }
    }
}

fn default_results_path() -> String {
    "start_up_results_with_other_libs.json".to_string()
}
fn default_format() -> String {
    "table".to_string()
}

impl MatrixConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path.display(), e))?;
        Ok(config)
    }

    /// Find `matrixbench.toml` by walking up from the current directory
    pub fn discover_path() -> Option<PathBuf> {
        let mut dir = std::env::current_dir().ok()?;
        loop {
            let config_path = dir.join(CONFIG_FILE_NAME);
            if config_path.exists() {
                return Some(config_path);
            }
            if !dir.pop() {
                break;
            }
        }
        None
    }

    /// Check values that the runner and reporter rely on
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.matrix.to_matrix().validate()?;
        if self.runner.repetitions == 0 {
            return Err(ConfigError::ZeroRepetitions);
        }
        if self.runner.program.trim().is_empty() {
            return Err(ConfigError::EmptyProgram);
        }
        Ok(())
    }

    /// Generate a default configuration as TOML string
    pub fn default_toml() -> String {
        r#"# matrixbench configuration

[matrix]
# First argument passed to the benchmark program
operations = ["Deserialize", "Serialize"]
# Third argument passed to the benchmark program
payload_types = [
    "LoginViewModel",
    "Location",
    "IndexViewModel",
    "MyEventsListerViewModel",
    "CollectionsOfPrimitives",
]
# Second argument passed to the benchmark program
mechanisms = ["Jil", "Json.NET", "Utf8Json", "Default", "AOT_LoadConverters", "AOT_Raw"]
# Ratios in the report are relative to this mechanism
baseline = "Default"

[runner]
# Invoked as: <program> <args...> <operation> <mechanism> <payload_type>
program = "dotnet"
args = ["run", "Benchmarks"]
# Directory to run in (uncomment to enable)
# working_dir = "src/Benchmarks"
# Samples per job; the recorded value is their integer mean
repetitions = 10

[reset]
# Deleted before every sample
directories = ["bin", "obj"]
# Killed before every sample (set to "" to disable)
process = "dotnet"

[output]
# Results are saved here by `run` and read by `report`
results_path = "start_up_results_with_other_libs.json"
# Report format: table, json, csv
format = "table"
"#
        .to_string()
    }
}
