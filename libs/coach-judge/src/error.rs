use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Infrastructure faults in the judging path.
///
/// A submission that fails to compile or a test that crashes is NOT an
/// error here; those are legitimate judging outcomes carried inside the
/// report. `JudgeError` is reserved for faults in the judge itself:
/// workspace allocation, compiler binary unreachable, artifact spawn
/// failure. Callers surface these as a 5xx-equivalent, never as a
/// passing or failing test.
#[derive(Debug, Error)]
pub enum JudgeError {
    #[error("failed to create workspace under {root}: {source}")]
    WorkspaceCreate {
        root: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {path} into workspace: {source}")]
    WorkspaceWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to launch compiler '{program}': {source}")]
    CompilerSpawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to collect compiler output: {0}")]
    CompilerCapture(#[source] io::Error),

    #[error("failed to launch compiled artifact {artifact}: {source}")]
    ArtifactSpawn {
        artifact: PathBuf,
        #[source]
        source: io::Error,
    },
}
