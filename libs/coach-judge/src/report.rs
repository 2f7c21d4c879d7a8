use std::time::Duration;

use coach_common::{CompileOutcome, EvaluationReport, TestResult};

/// Assemble the terminal report from a compile outcome and the ordered
/// test results. Pure data transformation, no I/O.
///
/// A failed compile yields an empty result sequence and the compiler
/// diagnostics as `compile_error`; elapsed time then covers only the
/// compile attempt.
pub fn build(
    compile: CompileOutcome,
    results: Vec<TestResult>,
    elapsed: Duration,
) -> EvaluationReport {
    let compiled = compile.succeeded;
    EvaluationReport {
        compiled,
        compile_error: if compiled {
            String::new()
        } else {
            compile.diagnostics
        },
        test_results: if compiled { results } else { Vec::new() },
        total_execution_time_ms: elapsed.as_millis() as u64,
    }
}

#[cfg(test)]
mod tests {
    use coach_common::TestOutcome;

    use super::*;

    fn result(seq: u32, passed: bool) -> TestResult {
        TestResult {
            test_case: seq,
            input: String::new(),
            expected: "x".into(),
            actual: if passed { "x".into() } else { "y".into() },
            passed,
            outcome: TestOutcome::Ok,
        }
    }

    #[test]
    fn successful_compile_keeps_results_in_order() {
        let report = build(
            CompileOutcome::success(String::new()),
            vec![result(1, true), result(2, false), result(3, true)],
            Duration::from_millis(120),
        );

        assert!(report.compiled);
        assert!(report.compile_error.is_empty());
        let sequence: Vec<u32> = report.test_results.iter().map(|r| r.test_case).collect();
        assert_eq!(sequence, vec![1, 2, 3]);
        assert_eq!(report.total_execution_time_ms, 120);
    }

    #[test]
    fn failed_compile_drops_results_and_carries_diagnostics() {
        let report = build(
            CompileOutcome::failure("solution.cpp:1: error".into()),
            vec![result(1, true)],
            Duration::from_millis(30),
        );

        assert!(!report.compiled);
        assert_eq!(report.compile_error, "solution.cpp:1: error");
        assert!(report.test_results.is_empty());
    }
}
