use crate::PrefixError;
use std::path::PathBuf;
use std::process::Command;

/// One process invocation: what to run, where, and with which environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSpec {
    pub program: String,
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
    pub cwd: Option<PathBuf>,
}

impl RunSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: Vec::new(),
            cwd: None,
        }
    }

    /// Render the invocation for logs and error messages.
    pub fn render(&self) -> String {
        if self.args.is_empty() {
            self.program.clone()
        } else {
            format!("{} {}", self.program, self.args.join(" "))
        }
    }
}

/// External process-execution collaborator.
///
/// `run` spawns and waits for exit, failing on a non-zero status; `spawn`
/// starts the process and returns without waiting, for launchers that re-exec
/// into a differently named client process.
pub trait Runner: Send + Sync {
    fn run(&self, spec: &RunSpec) -> Result<(), PrefixError>;
    fn spawn(&self, spec: &RunSpec) -> Result<(), PrefixError>;
}

/// `Runner` backed by `std::process::Command`.
#[derive(Debug, Default)]
pub struct SystemRunner;

impl SystemRunner {
    fn command(spec: &RunSpec) -> Command {
        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args);
        for (key, val) in &spec.env {
            cmd.env(key, val);
        }
        if let Some(ref cwd) = spec.cwd {
            cmd.current_dir(cwd);
        }
        cmd
    }
}

impl Runner for SystemRunner {
    fn run(&self, spec: &RunSpec) -> Result<(), PrefixError> {
        let status = Self::command(spec)
            .status()
            .map_err(|source| PrefixError::Spawn {
                command: spec.render(),
                source,
            })?;

        if !status.success() {
            return Err(PrefixError::Exit {
                command: spec.render(),
                code: status.code().unwrap_or(-1),
            });
        }

        Ok(())
    }

    fn spawn(&self, spec: &RunSpec) -> Result<(), PrefixError> {
        Self::command(spec)
            .spawn()
            .map(drop)
            .map_err(|source| PrefixError::Spawn {
                command: spec.render(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_includes_args() {
        let mut spec = RunSpec::new("wineboot");
        assert_eq!(spec.render(), "wineboot");
        spec.args.push("-u".to_owned());
        assert_eq!(spec.render(), "wineboot -u");
    }

    #[test]
    fn run_surfaces_nonzero_exit_with_command() {
        let spec = RunSpec {
            program: "false".to_owned(),
            args: Vec::new(),
            env: Vec::new(),
            cwd: None,
        };
        let err = SystemRunner.run(&spec).unwrap_err();
        match err {
            PrefixError::Exit { command, code } => {
                assert_eq!(command, "false");
                assert_eq!(code, 1);
            }
            other => panic!("expected Exit, got {other:?}"),
        }
    }

    #[test]
    fn run_surfaces_spawn_failure_with_command() {
        let spec = RunSpec::new("solera-no-such-binary");
        let err = SystemRunner.run(&spec).unwrap_err();
        assert!(matches!(err, PrefixError::Spawn { .. }));
        assert!(err.to_string().contains("solera-no-such-binary"));
    }
}
