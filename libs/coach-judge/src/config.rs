use std::path::PathBuf;
use std::time::Duration;

/// Judge configuration, loaded from `COACH_*` environment variables
/// with code defaults. The toolchain command is a template: `{source}`
/// and `{artifact}` in any argument are replaced with the
/// workspace-local paths at compile time.
#[derive(Debug, Clone)]
pub struct JudgeConfig {
    /// Directory under which per-request workspaces are created.
    pub workspace_root: PathBuf,
    /// Compiler program, e.g. `g++`.
    pub compiler: String,
    /// Compiler argument template.
    pub compile_args: Vec<String>,
    /// Workspace-relative name for the submitted source file.
    pub source_file: String,
    /// Workspace-relative name the toolchain must produce.
    pub artifact_file: String,
    /// Deadline for the whole compile step.
    pub compile_timeout: Duration,
    /// Per-test wall-clock budget for the untrusted program.
    pub test_timeout: Duration,
    /// Upper bound on concurrent test executions within one request.
    pub test_fanout: usize,
}

impl Default for JudgeConfig {
    fn default() -> Self {
        Self {
            workspace_root: std::env::temp_dir().join("codecoach"),
            compiler: "g++".to_string(),
            compile_args: vec![
                "{source}".to_string(),
                "-o".to_string(),
                "{artifact}".to_string(),
            ],
            source_file: "solution.cpp".to_string(),
            artifact_file: "solution.bin".to_string(),
            compile_timeout: Duration::from_millis(10_000),
            test_timeout: Duration::from_millis(2_000),
            test_fanout: 4,
        }
    }
}

impl JudgeConfig {
    /// Build a config from the environment, falling back to defaults
    /// for anything unset or unparseable.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            workspace_root: std::env::var("COACH_WORKSPACE_ROOT")
                .map(PathBuf::from)
                .unwrap_or(defaults.workspace_root),
            compiler: std::env::var("COACH_COMPILER").unwrap_or(defaults.compiler),
            compile_args: std::env::var("COACH_COMPILE_ARGS")
                .map(|raw| raw.split_whitespace().map(str::to_string).collect())
                .unwrap_or(defaults.compile_args),
            source_file: std::env::var("COACH_SOURCE_FILE").unwrap_or(defaults.source_file),
            artifact_file: std::env::var("COACH_ARTIFACT_FILE").unwrap_or(defaults.artifact_file),
            compile_timeout: env_millis("COACH_COMPILE_TIMEOUT_MS", defaults.compile_timeout),
            test_timeout: env_millis("COACH_TEST_TIMEOUT_MS", defaults.test_timeout),
            test_fanout: std::env::var("COACH_TEST_FANOUT")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|&n| n > 0)
                .unwrap_or(defaults.test_fanout),
        }
    }
}

fn env_millis(var: &str, default: Duration) -> Duration {
    std::env::var(var)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(default)
}
