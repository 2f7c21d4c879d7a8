use std::time::Instant;

use coach_common::{EvaluationReport, Submission, TestResult};
use futures_util::stream::{self, StreamExt};
use tracing::{info, instrument};

use crate::config::JudgeConfig;
use crate::error::JudgeError;
use crate::workspace::Workspace;
use crate::{compiler, executor, report};

/// Evaluation coordinator: drives one submission through
/// workspace acquisition, compilation, bounded-fan-out test execution
/// and report assembly.
///
/// Requests share no mutable state; each evaluation owns its workspace
/// for its whole lifetime and the workspace is released on every exit
/// path, including infrastructure faults and caller cancellation (the
/// workspace's Drop guard covers the cancellation case, and
/// `kill_on_drop` on the children reaps any in-flight process).
pub struct Judge {
    config: JudgeConfig,
}

impl Judge {
    pub fn new(config: JudgeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &JudgeConfig {
        &self.config
    }

    /// Judge one submission end-to-end.
    ///
    /// `Ok` carries a report for both verdicts the user can cause
    /// (compile failure included); `Err` is strictly an infrastructure
    /// fault and never a statement about the submission.
    #[instrument(
        skip(self, submission),
        fields(
            test_cases = submission.test_cases.len(),
            source_bytes = submission.code.len(),
        )
    )]
    pub async fn evaluate(&self, submission: &Submission) -> Result<EvaluationReport, JudgeError> {
        let started = Instant::now();
        let workspace = Workspace::acquire(&self.config.workspace_root).await?;

        let outcome = self.run_pipeline(&workspace, submission, started).await;
        workspace.release().await;
        outcome
    }

    async fn run_pipeline(
        &self,
        workspace: &Workspace,
        submission: &Submission,
        started: Instant,
    ) -> Result<EvaluationReport, JudgeError> {
        let compile = compiler::compile(workspace, &submission.code, &self.config).await?;

        if !compile.succeeded {
            info!(
                elapsed_ms = started.elapsed().as_millis() as u64,
                "compilation rejected, no tests run"
            );
            return Ok(report::build(compile, Vec::new(), started.elapsed()));
        }

        let artifact = workspace.file(&self.config.artifact_file);
        let fanout = self.config.test_fanout.max(1);

        // The artifact is read/execute-only from here on; test runs
        // only touch disjoint pipes, so they may overlap freely.
        // `buffered` caps in-flight runs at the fan-out limit and
        // yields results in submission order regardless of which run
        // finishes first.
        let runs: Vec<_> = submission.test_cases.iter().enumerate().map(|(idx, case)| {
            let artifact = artifact.clone();
            let sequence = (idx + 1) as u32;
            async move {
                executor::run_test(workspace, &artifact, case, sequence, self.config.test_timeout)
                    .await
            }
        }).collect();

        let collected: Vec<Result<TestResult, JudgeError>> =
            stream::iter(runs).buffered(fanout).collect().await;

        let mut results = Vec::with_capacity(collected.len());
        for result in collected {
            results.push(result?);
        }

        info!(
            tests = results.len(),
            passed = results.iter().filter(|r| r.passed).count(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "evaluation complete"
        );

        Ok(report::build(compile, results, started.elapsed()))
    }
}
