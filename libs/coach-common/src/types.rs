use serde::{Deserialize, Serialize};

/// One user submission: source code plus the test cases to judge it against.
/// Immutable once received; test case order is significant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub code: String,
    pub test_cases: Vec<TestCase>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestCase {
    pub input: String,
    pub expected: String,
}

/// How a single test execution concluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestOutcome {
    /// Process exited with status zero. `passed` still depends on the
    /// output comparison.
    Ok,
    NonZeroExit,
    Timeout,
    Crashed,
    IoError,
}

/// Outcome of running the compiled artifact against one test case.
/// All text is copied out of the workspace; nothing here references
/// workspace paths after teardown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResult {
    /// 1-based position in the submitted test case sequence.
    pub test_case: u32,
    pub input: String,
    pub expected: String,
    pub actual: String,
    pub passed: bool,
    pub outcome: TestOutcome,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompileOutcome {
    pub succeeded: bool,
    /// Combined compiler stdout + stderr. Never empty on failure; a
    /// compiler that dies silently gets a synthesized diagnostic.
    pub diagnostics: String,
}

impl CompileOutcome {
    pub fn success(diagnostics: String) -> Self {
        Self {
            succeeded: true,
            diagnostics,
        }
    }

    pub fn failure(diagnostics: String) -> Self {
        Self {
            succeeded: false,
            diagnostics,
        }
    }
}

/// Terminal judging artifact for one submission. Immutable once built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub compiled: bool,
    pub compile_error: String,
    pub test_results: Vec<TestResult>,
    pub total_execution_time_ms: u64,
}
