use super::monitor::{self, MemorySampler};
use super::workdir::WorkingDirGuard;
use crate::core::models::result::ResourceUsage;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{ChildStdin, Command, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, instrument};

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("Failed to start '{program}': {source}")]
    Spawn {
        program: String,
        source: io::Error,
    },
    #[error("I/O error while communicating with '{program}': {source}")]
    Io {
        program: String,
        source: io::Error,
    },
    #[error("Cannot enter working directory '{path}': {source}")]
    WorkingDir { path: String, source: io::Error },
}

/// Describes one child process: program, argv, standard input and working directory.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessSpec {
    program: PathBuf,
    args: Vec<String>,
    stdin: Option<String>,
    working_dir: Option<PathBuf>,
}

impl ProcessSpec {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            stdin: None,
            working_dir: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn stdin(mut self, text: impl Into<String>) -> Self {
        self.stdin = Some(text.into());
        self
    }

    /// Runs the process from `dir`, overriding the working directory of this process
    /// for the duration of the call.
    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn arguments(&self) -> &[String] {
        &self.args
    }

    pub fn stdin_text(&self) -> Option<&str> {
        self.stdin.as_deref()
    }

    pub fn dir(&self) -> Option<&Path> {
        self.working_dir.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProcessOutput {
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub usage: ResourceUsage,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Launches child processes and measures their wall-clock time and peak memory.
#[derive(Debug, Clone, Copy)]
pub struct ProcessRunner {
    sampler: MemorySampler,
}

impl ProcessRunner {
    pub fn new(sample_interval: Duration) -> Self {
        Self {
            sampler: MemorySampler::new(sample_interval),
        }
    }

    /// Runs `spec` to completion.
    ///
    /// A non-zero exit status is returned in [`ProcessOutput::exit_code`], not raised.
    /// Errors are limited to failures of this process: the working directory cannot be
    /// entered, the program cannot be started, or its pipes fail.
    #[instrument(level = "debug", skip_all, fields(program = %spec.program.display()))]
    pub fn run(&self, spec: &ProcessSpec) -> Result<ProcessOutput, ProcessError> {
        let _guard = spec
            .working_dir
            .as_deref()
            .map(|dir| {
                WorkingDirGuard::enter(dir).map_err(|source| ProcessError::WorkingDir {
                    path: dir.display().to_string(),
                    source,
                })
            })
            .transpose()?;

        let program = spec.program.display().to_string();
        let mut command = Command::new(&spec.program);
        command
            .args(&spec.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let started = Instant::now();
        let mut child = command.spawn().map_err(|source| ProcessError::Spawn {
            program: program.clone(),
            source,
        })?;
        let pid = child.id();
        let stdin = child.stdin.take();
        let input = spec.stdin.as_deref().unwrap_or("");
        let (stop_tx, stop_rx) = mpsc::channel();
        let sampler = self.sampler;

        let (output, fed, samples) = thread::scope(|scope| {
            let sampling = scope.spawn(move || sampler.sample(pid, stop_rx));
            let feeding = scope.spawn(move || feed_stdin(stdin, input));
            let output = child.wait_with_output();
            // The sampler may already have stopped on its own.
            let _ = stop_tx.send(());
            let fed = feeding
                .join()
                .unwrap_or_else(|_| Err(io::Error::other("stdin writer panicked")));
            let samples = sampling.join().unwrap_or_default();
            (output, fed, samples)
        });
        let elapsed = started.elapsed();

        let output = output.map_err(|source| ProcessError::Io {
            program: program.clone(),
            source,
        })?;
        fed.map_err(|source| ProcessError::Io {
            program: program.clone(),
            source,
        })?;

        let usage = ResourceUsage {
            elapsed_seconds: elapsed.as_secs_f64(),
            peak_memory_bytes: monitor::peak(&samples),
        };
        let exit_code = output.status.code();
        debug!(
            ?exit_code,
            elapsed_seconds = usage.elapsed_seconds,
            peak_memory_bytes = ?usage.peak_memory_bytes,
            samples = samples.len(),
            "Process finished."
        );

        Ok(ProcessOutput {
            exit_code,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            usage,
        })
    }
}

/// Writes `input` to the child and closes its standard input.
///
/// A child that exits without reading its input closes the pipe first; that is not an error.
fn feed_stdin(stdin: Option<ChildStdin>, input: &str) -> io::Result<()> {
    let Some(mut pipe) = stdin else {
        return Ok(());
    };
    if input.is_empty() {
        return Ok(());
    }
    match pipe.write_all(input.as_bytes()) {
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        other => other,
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;
    use tempfile::tempdir;

    fn runner() -> ProcessRunner {
        ProcessRunner::new(Duration::from_millis(20))
    }

    fn sh(script: &str) -> ProcessSpec {
        ProcessSpec::new("/bin/sh").arg("-c").arg(script)
    }

    #[test]
    #[serial]
    fn captures_stdout_and_stderr() {
        let output = runner().run(&sh("echo out; echo err >&2")).unwrap();
        assert!(output.success());
        assert_eq!(output.stdout, "out\n");
        assert_eq!(output.stderr, "err\n");
        assert!(output.usage.elapsed_seconds >= 0.0);
    }

    #[test]
    #[serial]
    fn feeds_standard_input() {
        let output = runner().run(&sh("cat").stdin("MLLLLV")).unwrap();
        assert_eq!(output.stdout, "MLLLLV");
    }

    #[test]
    #[serial]
    fn ignores_input_the_child_never_reads() {
        let big = "M".repeat(1 << 20);
        let output = runner().run(&sh("exit 0").stdin(big)).unwrap();
        assert!(output.success());
    }

    #[test]
    #[serial]
    fn nonzero_exit_is_returned_not_raised() {
        let output = runner().run(&sh("echo boom >&2; exit 3")).unwrap();
        assert!(!output.success());
        assert_eq!(output.exit_code, Some(3));
        assert_eq!(output.stderr, "boom\n");
    }

    #[test]
    #[serial]
    fn missing_program_is_a_spawn_error() {
        let dir = tempdir().unwrap();
        let result = runner().run(&ProcessSpec::new(dir.path().join("no-such-engine")));
        assert!(matches!(result, Err(ProcessError::Spawn { .. })));
    }

    #[test]
    #[serial]
    fn fast_process_has_unknown_peak_memory() {
        let slow_sampling = ProcessRunner::new(Duration::from_secs(30));
        let output = slow_sampling.run(&sh("exit 0")).unwrap();
        assert_eq!(output.usage.peak_memory_bytes, None);
        assert!(output.usage.elapsed_seconds < 30.0);
    }

    #[test]
    #[serial]
    fn long_running_process_reports_peak_memory() {
        let output = runner().run(&sh("sleep 0.5")).unwrap();
        assert!(output.usage.peak_memory_bytes.is_some_and(|bytes| bytes > 0));
        assert!(output.usage.elapsed_seconds >= 0.5);
    }

    #[test]
    #[serial]
    fn runs_inside_requested_working_directory() {
        let original = env::current_dir().unwrap();
        let dir = tempdir().unwrap();
        let output = runner().run(&sh("pwd").working_dir(dir.path())).unwrap();
        assert_eq!(
            PathBuf::from(output.stdout.trim()).canonicalize().unwrap(),
            dir.path().canonicalize().unwrap()
        );
        assert_eq!(env::current_dir().unwrap(), original);
    }

    #[test]
    #[serial]
    fn working_directory_is_restored_when_launch_fails() {
        let original = env::current_dir().unwrap();
        let dir = tempdir().unwrap();
        let spec = ProcessSpec::new("bin/missing-engine").working_dir(dir.path());
        assert!(matches!(
            runner().run(&spec),
            Err(ProcessError::Spawn { .. })
        ));
        assert_eq!(env::current_dir().unwrap(), original);
    }
}
