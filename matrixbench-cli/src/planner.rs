//! Run Planner
//!
//! Expands a matrix into the jobs and command lines a run would execute,
//! grouped by (operation, payload type). Used by `matrixbench list`.

use matrixbench_core::{CommandProcess, Matrix, group_title};

/// A job and the command that measures it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedJob {
    /// Results key
    pub label: String,
    /// Mechanism under test
    pub mechanism: String,
    /// Command line the runner would spawn
    pub command: String,
}

/// Jobs sharing one report block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedGroup {
    /// Block title
    pub title: String,
    /// Jobs in mechanism order
    pub jobs: Vec<PlannedJob>,
}

/// Execution plan for a matrix
#[derive(Debug, Clone)]
pub struct ExecutionPlan {
    /// Groups in run order
    pub groups: Vec<PlannedGroup>,
    /// Samples per job
    pub repetitions: usize,
}

impl ExecutionPlan {
    /// Number of jobs
    pub fn job_count(&self) -> usize {
        self.groups.iter().map(|g| g.jobs.len()).sum()
    }

    /// Number of program invocations a run would make
    pub fn invocation_count(&self) -> usize {
        self.job_count() * self.repetitions
    }
}

/// Build the plan in the same order the runner executes it
pub fn build_plan(matrix: &Matrix, process: &CommandProcess, repetitions: usize) -> ExecutionPlan {
    let groups = matrix
        .groups()
        .map(|(operation, payload_type)| PlannedGroup {
            title: group_title(operation, payload_type),
            jobs: matrix
                .jobs()
                .filter(|j| j.operation == operation && j.payload_type == payload_type)
                .map(|job| PlannedJob {
                    label: job.label(),
                    mechanism: job.mechanism.clone(),
                    command: process.command_line(&job.args()),
                })
                .collect(),
        })
        .collect();

    ExecutionPlan {
        groups,
        repetitions,
    }
}

/// Render the plan as a tree
pub fn format_plan(plan: &ExecutionPlan, baseline: &str) -> String {
    let mut output = String::from("matrixbench plan:\n");

    for group in &plan.groups {
        output.push_str(&format!("├── {}\n", group.title));
        for job in &group.jobs {
            let marker = if job.mechanism == baseline {
                " (baseline)"
            } else {
                ""
            };
            output.push_str(&format!("│   ├── {}{}\n", job.label, marker));
            output.push_str(&format!("│   │     $ {}\n", job.command));
        }
    }

    output.push_str(&format!(
        "{} jobs × {} repetitions = {} invocations.\n",
        plan.job_count(),
        plan.repetitions,
        plan.invocation_count()
    ));
    output
}
