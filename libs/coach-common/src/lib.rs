pub mod types;

pub use types::{
    CompileOutcome, EvaluationReport, Submission, TestCase, TestOutcome, TestResult,
};
