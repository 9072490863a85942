use crate::error::{SyncError, SyncResult};
use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, error};

/// Runs `kubectl` subcommands and hands back their stdout.
///
/// A non-zero exit is always an error; callers never see partial output.
#[async_trait]
pub trait Kubectl: Send + Sync {
    async fn run(&self, args: &[String]) -> SyncResult<String>;
}

/// The real thing: spawns the binary found on `PATH` (or a configured path).
pub struct KubectlCli {
    program: String,
}

impl KubectlCli {
    pub fn new(program: impl Into<String>) -> Self {
        Self { program: program.into() }
    }

    fn render(&self, args: &[String]) -> String {
        let parts = std::iter::once(self.program.as_str()).chain(args.iter().map(String::as_str));
        shlex::try_join(parts).unwrap_or_else(|_| format!("{} {}", self.program, args.join(" ")))
    }
}

#[async_trait]
impl Kubectl for KubectlCli {
    async fn run(&self, args: &[String]) -> SyncResult<String> {
        let command = self.render(args);
        debug!(%command, "running");

        let output = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|source| SyncError::Spawn { command: command.clone(), source })?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            error!(%command, status = %output.status, %stderr, "kubectl failed");
            Err(SyncError::Kubectl { command, status: output.status, stderr })
        }
    }
}

/// Shorthand for building argument vectors from string literals.
pub fn args<I, S>(parts: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    parts.into_iter().map(Into::into).collect()
}
