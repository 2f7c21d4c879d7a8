use std::process::Stdio;

use coach_common::CompileOutcome;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::config::JudgeConfig;
use crate::error::JudgeError;
use crate::workspace::Workspace;

/// Write the submitted source into the workspace and run the external
/// toolchain against it.
///
/// Success means the compiler exited with status zero AND the expected
/// artifact file exists. A non-zero exit, a missing artifact, or a
/// blown compile deadline is a `CompileOutcome` failure with non-empty
/// diagnostics; only a compiler binary that cannot be launched at all
/// is a `JudgeError` (infrastructure fault).
pub async fn compile(
    workspace: &Workspace,
    source: &str,
    config: &JudgeConfig,
) -> Result<CompileOutcome, JudgeError> {
    let source_path = workspace.write(&config.source_file, source).await?;
    let artifact_path = workspace.file(&config.artifact_file);

    let args: Vec<String> = config
        .compile_args
        .iter()
        .map(|arg| {
            arg.replace("{source}", &source_path.to_string_lossy())
                .replace("{artifact}", &artifact_path.to_string_lossy())
        })
        .collect();

    debug!(compiler = %config.compiler, ?args, "invoking toolchain");

    let child = Command::new(&config.compiler)
        .args(&args)
        .current_dir(workspace.path())
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| JudgeError::CompilerSpawn {
            program: config.compiler.clone(),
            source,
        })?;

    let output = match timeout(config.compile_timeout, child.wait_with_output()).await {
        Ok(result) => result.map_err(JudgeError::CompilerCapture)?,
        Err(_) => {
            // Dropping the wait future killed the compiler via
            // kill_on_drop; report the expiry as a judging outcome.
            warn!(
                timeout_ms = config.compile_timeout.as_millis() as u64,
                "compile deadline expired"
            );
            return Ok(CompileOutcome::failure(format!(
                "compilation did not finish within {} ms",
                config.compile_timeout.as_millis()
            )));
        }
    };

    let mut diagnostics = String::from_utf8_lossy(&output.stdout).into_owned();
    diagnostics.push_str(&String::from_utf8_lossy(&output.stderr));

    let artifact_present = tokio::fs::try_exists(&artifact_path).await.unwrap_or(false);

    if output.status.success() && artifact_present {
        return Ok(CompileOutcome::success(diagnostics));
    }

    if diagnostics.trim().is_empty() {
        diagnostics = if output.status.success() {
            format!(
                "compiler exited successfully but produced no artifact at {}",
                config.artifact_file
            )
        } else {
            format!("compiler exited with {} and no diagnostics", output.status)
        };
    }

    Ok(CompileOutcome::failure(diagnostics))
}
