use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use coach_common::{TestCase, TestOutcome, TestResult};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::error::JudgeError;
use crate::workspace::Workspace;

/// Placeholder actual-output recorded when the process was killed at
/// its deadline and stdout was abandoned.
const TIMEOUT_PLACEHOLDER: &str = "[no output: time limit exceeded]";

/// Run the compiled artifact against one test case.
///
/// The test input is piped straight to the child's stdin (no shared
/// temp files, so concurrent executions within and across requests
/// stay disjoint). The child runs in its own process group; when the
/// wall-clock budget expires the whole group is SIGKILLed so the
/// untrusted program cannot leak descendants past its deadline.
///
/// Everything the child does wrong folds into the returned
/// `TestResult`; only a failure to launch the artifact at all is an
/// infrastructure fault.
pub async fn run_test(
    workspace: &Workspace,
    artifact: &Path,
    case: &TestCase,
    sequence: u32,
    time_limit: Duration,
) -> Result<TestResult, JudgeError> {
    let mut command = Command::new(artifact);
    command
        .current_dir(workspace.path())
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    // Own process group, so a timeout kill reaches forked children too.
    #[cfg(unix)]
    command.process_group(0);

    let mut child = command.spawn().map_err(|source| JudgeError::ArtifactSpawn {
        artifact: artifact.to_path_buf(),
        source,
    })?;

    let pid = child.id();

    if let Some(mut stdin) = child.stdin.take() {
        let input = case.input.clone();
        tokio::spawn(async move {
            // EPIPE here just means the program exited without reading
            // its input; that is judged from its exit status, not here.
            if let Err(e) = stdin.write_all(input.as_bytes()).await {
                debug!(error = %e, "test input not fully consumed");
            }
        });
    }

    let result = match timeout(time_limit, child.wait_with_output()).await {
        Ok(wait_result) => wait_result,
        Err(_) => {
            kill_process_group(pid);
            warn!(
                test_case = sequence,
                time_limit_ms = time_limit.as_millis() as u64,
                "test execution timed out, process group killed"
            );
            return Ok(TestResult {
                test_case: sequence,
                input: case.input.clone(),
                expected: case.expected.clone(),
                actual: TIMEOUT_PLACEHOLDER.to_string(),
                passed: false,
                outcome: TestOutcome::Timeout,
            });
        }
    };

    let (actual, passed, outcome) = match result {
        Ok(output) => {
            let captured = String::from_utf8_lossy(&output.stdout);
            let actual = strip_trailing_newline(&captured).to_string();

            match output.status.code() {
                Some(0) => {
                    let passed = actual == case.expected;
                    (actual, passed, TestOutcome::Ok)
                }
                // Exit-code mismatch is reported distinctly even when
                // the output happens to match.
                Some(_) => (actual, false, TestOutcome::NonZeroExit),
                None => (actual, false, TestOutcome::Crashed),
            }
        }
        Err(e) => {
            warn!(test_case = sequence, error = %e, "failed to capture test output");
            (
                format!("[no output: {e}]"),
                false,
                TestOutcome::IoError,
            )
        }
    };

    Ok(TestResult {
        test_case: sequence,
        input: case.input.clone(),
        expected: case.expected.clone(),
        actual,
        passed,
        outcome,
    })
}

/// Strip exactly one trailing line terminator (`\n` or `\r\n`).
/// Interior whitespace is preserved; judging is byte-exact otherwise.
fn strip_trailing_newline(text: &str) -> &str {
    text.strip_suffix("\r\n")
        .or_else(|| text.strip_suffix('\n'))
        .unwrap_or(text)
}

#[cfg(unix)]
fn kill_process_group(pid: Option<u32>) {
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    if let Some(pid) = pid {
        if let Err(e) = killpg(Pid::from_raw(pid as i32), Signal::SIGKILL) {
            // ESRCH means the group is already gone, which is fine.
            if e != nix::errno::Errno::ESRCH {
                warn!(pid, error = %e, "failed to kill process group");
            }
        }
    }
}

#[cfg(not(unix))]
fn kill_process_group(_pid: Option<u32>) {}
