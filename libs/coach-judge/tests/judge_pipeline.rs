//! End-to-end pipeline tests against POSIX toolchains, so the suite
//! runs without a real C++ compiler installed. The judge only cares
//! that the configured command leaves an executable artifact behind.

#![cfg(unix)]

use std::time::Duration;

use coach_common::{Submission, TestCase, TestOutcome};
use coach_judge::{Judge, JudgeConfig};

fn case(input: &str, expected: &str) -> TestCase {
    TestCase {
        input: input.to_string(),
        expected: expected.to_string(),
    }
}

fn submission(code: &str, cases: Vec<TestCase>) -> Submission {
    Submission {
        code: code.to_string(),
        test_cases: cases,
    }
}

fn base_config(root: &str) -> JudgeConfig {
    JudgeConfig {
        workspace_root: std::env::temp_dir().join(root),
        test_timeout: Duration::from_secs(5),
        ..JudgeConfig::default()
    }
}

/// Toolchain that installs `/bin/cat` as the artifact: the "compiled
/// program" echoes its stdin.
fn cat_judge(root: &str) -> Judge {
    let mut config = base_config(root);
    config.compiler = "cp".to_string();
    config.compile_args = vec!["/bin/cat".to_string(), "{artifact}".to_string()];
    Judge::new(config)
}

/// Toolchain that writes a fixed shell script as the artifact.
fn script_judge(root: &str, body: &str) -> Judge {
    let mut config = base_config(root);
    config.compiler = "sh".to_string();
    config.compile_args = vec![
        "-c".to_string(),
        format!("printf '#!/bin/sh\n{body}\n' > {{artifact}} && chmod +x {{artifact}}"),
    ];
    Judge::new(config)
}

/// Toolchain that always rejects the source.
fn rejecting_judge(root: &str) -> Judge {
    let mut config = base_config(root);
    config.compiler = "sh".to_string();
    config.compile_args = vec![
        "-c".to_string(),
        "echo 'solution.cpp:1:1: error: expected unqualified-id' >&2; exit 1".to_string(),
    ];
    Judge::new(config)
}

#[tokio::test]
async fn trivial_correct_program_passes() {
    let judge = script_judge("codecoach-it-trivial", "echo ok");
    let report = judge
        .evaluate(&submission("print ok", vec![case("", "ok")]))
        .await
        .unwrap();

    assert!(report.compiled);
    assert!(report.compile_error.is_empty());
    assert_eq!(report.test_results.len(), 1);
    assert!(report.test_results[0].passed);
    assert_eq!(report.test_results[0].outcome, TestOutcome::Ok);
}

#[tokio::test]
async fn syntax_error_short_circuits_tests() {
    let judge = rejecting_judge("codecoach-it-reject");
    let report = judge
        .evaluate(&submission(
            "int main( {",
            vec![case("", "never run"), case("x", "y")],
        ))
        .await
        .unwrap();

    assert!(!report.compiled);
    assert!(report.compile_error.contains("expected unqualified-id"));
    assert!(report.test_results.is_empty());
}

#[tokio::test]
async fn echo_program_mixed_verdicts() {
    let judge = cat_judge("codecoach-it-echo");
    let report = judge
        .evaluate(&submission(
            "echo program",
            vec![case("alpha\n", "alpha"), case("beta\n", "gamma")],
        ))
        .await
        .unwrap();

    assert!(report.compiled);
    assert_eq!(report.test_results.len(), 2);

    assert!(report.test_results[0].passed);
    assert_eq!(report.test_results[0].outcome, TestOutcome::Ok);
    assert_eq!(report.test_results[0].actual, "alpha");

    assert!(!report.test_results[1].passed);
    assert_eq!(report.test_results[1].outcome, TestOutcome::Ok);
    assert_eq!(report.test_results[1].actual, "beta");
}

#[tokio::test]
async fn sleeper_yields_timeout_outcome() {
    let mut judge = script_judge("codecoach-it-sleep", "sleep 30");
    {
        // Rebuild with a short budget; Judge owns its config.
        let mut config = judge.config().clone();
        config.test_timeout = Duration::from_millis(200);
        judge = Judge::new(config);
    }

    let started = std::time::Instant::now();
    let report = judge
        .evaluate(&submission("sleeper", vec![case("", "")]))
        .await
        .unwrap();

    assert!(report.compiled);
    assert_eq!(report.test_results.len(), 1);
    assert_eq!(report.test_results[0].outcome, TestOutcome::Timeout);
    assert!(!report.test_results[0].passed);
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn result_count_matches_case_count() {
    let judge = cat_judge("codecoach-it-count");
    let cases: Vec<TestCase> = (0..7)
        .map(|i| case(&format!("{i}\n"), &format!("{i}")))
        .collect();
    let report = judge
        .evaluate(&submission("echo", cases))
        .await
        .unwrap();

    assert!(report.compiled);
    assert_eq!(report.test_results.len(), 7);
    assert!(report.test_results.iter().all(|r| r.passed));
}

#[tokio::test]
async fn parallel_fanout_preserves_submission_order() {
    let mut config = base_config("codecoach-it-order");
    config.compiler = "cp".to_string();
    config.compile_args = vec!["/bin/cat".to_string(), "{artifact}".to_string()];
    config.test_fanout = 4;
    let judge = Judge::new(config);

    let cases: Vec<TestCase> = (0..12)
        .map(|i| case(&format!("case-{i}\n"), &format!("case-{i}")))
        .collect();
    let report = judge.evaluate(&submission("echo", cases)).await.unwrap();

    let sequence: Vec<u32> = report.test_results.iter().map(|r| r.test_case).collect();
    assert_eq!(sequence, (1..=12).collect::<Vec<u32>>());
    for (idx, result) in report.test_results.iter().enumerate() {
        assert_eq!(result.actual, format!("case-{idx}"));
    }
}

#[tokio::test]
async fn repeated_evaluation_is_idempotent() {
    let judge = cat_judge("codecoach-it-idem");
    let sub = submission("echo", vec![case("same\n", "same"), case("a\n", "b")]);

    let first = judge.evaluate(&sub).await.unwrap();
    let second = judge.evaluate(&sub).await.unwrap();

    assert_eq!(first.compiled, second.compiled);
    for (a, b) in first.test_results.iter().zip(&second.test_results) {
        assert_eq!(a.passed, b.passed);
        assert_eq!(a.actual, b.actual);
        assert_eq!(a.outcome, b.outcome);
    }
}

#[tokio::test]
async fn concurrent_submissions_do_not_cross_contaminate() {
    let judge = cat_judge("codecoach-it-isolation");

    let left = submission(
        "echo",
        (0..5).map(|i| case(&format!("L{i}\n"), &format!("L{i}"))).collect(),
    );
    let right = submission(
        "echo",
        (0..5).map(|i| case(&format!("R{i}\n"), &format!("R{i}"))).collect(),
    );

    let (left_report, right_report) =
        tokio::join!(judge.evaluate(&left), judge.evaluate(&right));
    let left_report = left_report.unwrap();
    let right_report = right_report.unwrap();

    for (idx, result) in left_report.test_results.iter().enumerate() {
        assert_eq!(result.actual, format!("L{idx}"));
        assert!(result.passed);
    }
    for (idx, result) in right_report.test_results.iter().enumerate() {
        assert_eq!(result.actual, format!("R{idx}"));
        assert!(result.passed);
    }
}

#[tokio::test]
async fn missing_toolchain_is_an_error_not_a_report() {
    let mut config = base_config("codecoach-it-notoolchain");
    config.compiler = "codecoach-missing-toolchain".to_string();
    let judge = Judge::new(config);

    let result = judge.evaluate(&submission("x", vec![case("", "")])).await;
    assert!(result.is_err());
}
