//! External process invocation.
//!
//! All subprocesses take an explicit working directory via [`Cmd::current_dir`]
//! instead of mutating the ambient process cwd. Two run modes:
//!
//! - [`Cmd::run`]: capture stdout/stderr, return a [`CmdOutput`]
//! - [`Cmd::run_interactive`]: inherit stdio (yarn and mocha draw progress)

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use thiserror::Error;

/// Failure while launching or waiting on an external process.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// The process could not be spawned (missing binary, permissions).
    #[error("failed to launch '{program}': {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The process ran but exited non-zero.
    #[error("{message}")]
    Failed {
        program: String,
        code: Option<i32>,
        message: String,
    },
}

/// Captured result of a completed process.
#[derive(Debug)]
pub struct CmdOutput {
    /// Exit code, if the process terminated normally.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    success: bool,
}

impl CmdOutput {
    /// Whether the process exited zero.
    pub fn success(&self) -> bool {
        self.success
    }
}

/// Builder for an external command invocation.
pub struct Cmd {
    program: String,
    args: Vec<String>,
    cwd: Option<PathBuf>,
    error_msg: Option<String>,
    allow_fail: bool,
}

impl Cmd {
    /// Start building an invocation of `program`.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            error_msg: None,
            allow_fail: false,
        }
    }

    /// Append a single argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Append a path argument.
    pub fn arg_path(mut self, path: &Path) -> Self {
        self.args.push(path.to_string_lossy().into_owned());
        self
    }

    /// Run the process with this working directory.
    pub fn current_dir(mut self, dir: &Path) -> Self {
        self.cwd = Some(dir.to_path_buf());
        self
    }

    /// Message to use when the process exits non-zero.
    pub fn error_msg(mut self, msg: impl Into<String>) -> Self {
        self.error_msg = Some(msg.into());
        self
    }

    /// Do not treat a non-zero exit as an error; the caller inspects
    /// [`CmdOutput::success`] instead.
    pub fn allow_fail(mut self) -> Self {
        self.allow_fail = true;
        self
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        if let Some(cwd) = &self.cwd {
            cmd.current_dir(cwd);
        }
        cmd
    }

    fn failure(&self, code: Option<i32>) -> ProcessError {
        let message = match &self.error_msg {
            Some(msg) => msg.clone(),
            None => match code {
                Some(code) => format!("'{}' exited with status {}", self.program, code),
                None => format!("'{}' was terminated by a signal", self.program),
            },
        };
        ProcessError::Failed {
            program: self.program.clone(),
            code,
            message,
        }
    }

    /// Run the process, capturing stdout and stderr.
    pub fn run(self) -> Result<CmdOutput, ProcessError> {
        let output = self
            .command()
            .stdin(Stdio::null())
            .output()
            .map_err(|source| ProcessError::Launch {
                program: self.program.clone(),
                source,
            })?;

        let result = CmdOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            success: output.status.success(),
        };

        if !result.success && !self.allow_fail {
            return Err(self.failure(result.code));
        }
        Ok(result)
    }

    /// Run the process with inherited stdio.
    pub fn run_interactive(self) -> Result<(), ProcessError> {
        let status = self
            .command()
            .status()
            .map_err(|source| ProcessError::Launch {
                program: self.program.clone(),
                source,
            })?;

        if !status.success() && !self.allow_fail {
            return Err(self.failure(status.code()));
        }
        Ok(())
    }
}

/// Find a program on PATH, returning its full path.
pub fn which(program: &str) -> Option<String> {
    let path_var = std::env::var_os("PATH")?;
    for dir in std::env::split_paths(&path_var) {
        let candidate = dir.join(program);
        if candidate.is_file() {
            return Some(candidate.to_string_lossy().into_owned());
        }
    }
    None
}

/// Check if a program is available on PATH.
pub fn exists(program: &str) -> bool {
    which(program).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_captures_stdout() {
        let out = Cmd::new("echo").arg("hello").run().unwrap();
        assert!(out.success());
        assert_eq!(out.stdout.trim(), "hello");
    }

    #[test]
    fn test_run_nonzero_is_error() {
        let err = Cmd::new("false").run().unwrap_err();
        match err {
            ProcessError::Failed { code, .. } => assert_eq!(code, Some(1)),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_run_nonzero_allow_fail() {
        let out = Cmd::new("false").allow_fail().run().unwrap();
        assert!(!out.success());
        assert_eq!(out.code, Some(1));
    }

    #[test]
    fn test_run_missing_program() {
        let err = Cmd::new("definitely_not_a_real_command_12345").run().unwrap_err();
        assert!(matches!(err, ProcessError::Launch { .. }));
    }

    #[test]
    fn test_error_msg_overrides_default() {
        let err = Cmd::new("false")
            .error_msg("custom failure text")
            .run()
            .unwrap_err();
        assert_eq!(err.to_string(), "custom failure text");
    }

    #[test]
    fn test_current_dir() {
        let dir = tempfile::tempdir().unwrap();
        let out = Cmd::new("pwd").current_dir(dir.path()).run().unwrap();
        let reported = std::path::PathBuf::from(out.stdout.trim());
        // macOS tempdirs live behind /private symlinks
        assert_eq!(
            reported.canonicalize().unwrap(),
            dir.path().canonicalize().unwrap()
        );
    }

    #[test]
    fn test_which_existing() {
        assert!(exists("ls"));
    }

    #[test]
    fn test_which_nonexistent() {
        assert!(!exists("definitely_not_a_real_command_12345"));
    }
}
