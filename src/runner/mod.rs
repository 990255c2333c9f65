//! Synchronous command runner with file-backed output capture.
//!
//! One call to [`CommandRunner::run`] spawns one process, blocks until it
//! exits, and leaves its stdout and stderr in two capture files. Capture
//! files from an earlier run at the same paths are deleted first, so the
//! files on disk always belong to the latest invocation.

pub mod error;
pub mod request;

pub use error::RunError;
pub use request::{ExecutionRequest, ExecutionResult};

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use crate::logging::LogContext;
use crate::ports::{Clock, ShellExecutor};

/// File stem for capture files when the runner is not given one.
pub const DEFAULT_BASENAME: &str = "devkit";

/// How much of each capture file is copied into the log by default.
pub const DEFAULT_PREVIEW_BYTES: usize = 4096;

/// Creates `path` and any missing parents.
///
/// Returns `true` if the directory did not exist before.
///
/// # Errors
///
/// Returns `RunError::Filesystem` if the directory cannot be created.
pub fn ensure_directory(path: &Path) -> Result<bool, RunError> {
    if path.is_dir() {
        return Ok(false);
    }
    std::fs::create_dir_all(path).map_err(RunError::filesystem(path))?;
    Ok(true)
}

/// Runs commands through a `ShellExecutor`, logging into a `LogContext`.
pub struct CommandRunner<'a> {
    shell: &'a dyn ShellExecutor,
    clock: &'a dyn Clock,
    log: &'a LogContext,
    basename: String,
    preview_bytes: usize,
}

impl<'a> CommandRunner<'a> {
    /// Creates a runner with the default basename and log preview size.
    #[must_use]
    pub fn new(shell: &'a dyn ShellExecutor, clock: &'a dyn Clock, log: &'a LogContext) -> Self {
        Self {
            shell,
            clock,
            log,
            basename: DEFAULT_BASENAME.to_string(),
            preview_bytes: DEFAULT_PREVIEW_BYTES,
        }
    }

    /// Sets the file stem of the default capture files.
    #[must_use]
    pub fn with_basename(mut self, basename: impl Into<String>) -> Self {
        self.basename = basename.into();
        self
    }

    /// Sets how many bytes of each capture file are logged. 0 disables it.
    #[must_use]
    pub fn with_preview_bytes(mut self, bytes: usize) -> Self {
        self.preview_bytes = bytes;
        self
    }

    /// Default stdout capture path for `output_directory`.
    #[must_use]
    pub fn default_stdout_path(&self, output_directory: &Path) -> PathBuf {
        output_directory.join(format!("{}.stdout", self.basename))
    }

    /// Default stderr capture path for `output_directory`.
    #[must_use]
    pub fn default_stderr_path(&self, output_directory: &Path) -> PathBuf {
        output_directory.join(format!("{}.stderr", self.basename))
    }

    /// Runs the request to completion.
    ///
    /// # Errors
    ///
    /// Returns `RunError::EmptyCommand` before touching the filesystem if
    /// there is nothing to run, `RunError::Filesystem` if the directory or
    /// capture files cannot be prepared, `RunError::Spawn`/`RunError::Wait`
    /// for process-level failures, and `RunError::NonZeroExit` if the
    /// command exits with a nonzero status.
    pub fn run(&self, request: &ExecutionRequest) -> Result<ExecutionResult, RunError> {
        self.log.in_scope(|| {
            let result = self.execute(request);
            if let Err(err) = &result {
                error!("{err}");
            }
            result
        })
    }

    fn execute(&self, request: &ExecutionRequest) -> Result<ExecutionResult, RunError> {
        let command = request.command();
        if command.is_empty() {
            return Err(RunError::EmptyCommand);
        }
        info!("Will attempt to execute '{command}'");

        let output_directory = request.output_directory();
        if ensure_directory(output_directory)? {
            info!("Created output directory '{}'", output_directory.display());
        }

        let stdout_path = request
            .stdout_path()
            .map_or_else(|| self.default_stdout_path(output_directory), Path::to_path_buf);
        let stderr_path = request
            .stderr_path()
            .map_or_else(|| self.default_stderr_path(output_directory), Path::to_path_buf);

        let stdout = prepare_capture(&stdout_path, "STDOUT")?;
        let shared = names_same_file(&stdout_path, &stderr_path)?;
        let stderr = if shared {
            stdout.try_clone().map_err(RunError::filesystem(&stderr_path))?
        } else {
            prepare_capture(&stderr_path, "STDERR")?
        };

        let started_at = self.clock.now();
        let mut child = self
            .shell
            .spawn(command, stdout, stderr)
            .map_err(|source| RunError::Spawn { command: command.to_string(), source })?;
        let process_id = child.id();
        info!("The child process ID is '{process_id}'");

        let exit_status = child.wait().map_err(|source| RunError::Wait {
            command: command.to_string(),
            process_id,
            source,
        })?;
        let finished_at = self.clock.now();
        info!("The return code was '{exit_status}'");

        self.log_preview("stdout", &stdout_path);
        if !shared {
            self.log_preview("stderr", &stderr_path);
        }

        if exit_status != 0 {
            return Err(RunError::NonZeroExit {
                command: command.to_string(),
                exit_status,
                process_id,
                stdout_path,
                stderr_path,
            });
        }
        info!("Execution of cmd '{command}' has completed");

        Ok(ExecutionResult {
            exit_status,
            process_id,
            stdout_path,
            stderr_path,
            started_at,
            finished_at,
        })
    }

    fn log_preview(&self, stream: &str, path: &Path) {
        if self.preview_bytes == 0 {
            return;
        }
        match read_prefix(path, self.preview_bytes) {
            Ok((text, _)) if text.is_empty() => {}
            Ok((text, truncated)) => {
                let marker = if truncated { " [truncated]" } else { "" };
                info!("{stream} is: {}{marker}", text.trim_end());
            }
            Err(err) => warn!("Could not read {stream} file '{}': {err}", path.display()),
        }
    }
}

/// Deletes a stale capture file at `path` and creates an empty one.
fn prepare_capture(path: &Path, label: &str) -> Result<File, RunError> {
    match std::fs::remove_file(path) {
        Ok(()) => info!("{label} file '{}' already existed and was deleted", path.display()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(source) => return Err(RunError::Filesystem { path: path.to_path_buf(), source }),
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        ensure_directory(parent)?;
    }
    File::create(path).map_err(RunError::filesystem(path))
}

/// Whether `other` resolves to the capture file already created at `created`.
///
/// Resolves `..` segments and symlinks, so the parent of `other` is created
/// first.
fn names_same_file(created: &Path, other: &Path) -> Result<bool, RunError> {
    if created == other {
        return Ok(true);
    }
    if let Some(parent) = other.parent().filter(|p| !p.as_os_str().is_empty()) {
        ensure_directory(parent)?;
    }
    let other = match std::fs::canonicalize(other) {
        Ok(path) => path,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(source) => return Err(RunError::Filesystem { path: other.to_path_buf(), source }),
    };
    let created = std::fs::canonicalize(created).map_err(RunError::filesystem(created))?;
    Ok(created == other)
}

/// Reads at most `limit` bytes, returning the text and whether more remained.
fn read_prefix(path: &Path, limit: usize) -> io::Result<(String, bool)> {
    let mut buf = Vec::new();
    let cap = u64::try_from(limit).unwrap_or(u64::MAX).saturating_add(1);
    File::open(path)?.take(cap).read_to_end(&mut buf)?;
    let truncated = buf.len() > limit;
    buf.truncate(limit);
    Ok((String::from_utf8_lossy(&buf).into_owned(), truncated))
}

#[cfg(test)]
mod tests {
    use std::fs::File;
    use std::io::Write;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use chrono::{DateTime, Local, TimeZone};
    use tracing::level_filters::LevelFilter;

    use super::*;
    use crate::adapters::live::clock::LiveClock;
    use crate::adapters::live::shell::LiveShellExecutor;
    use crate::ports::{CommandLine, RunningProcess};

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("devkit_runner_{name}"));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    struct FixedClock;

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Local> {
            Local.with_ymd_and_hms(2026, 1, 31, 9, 15, 2).unwrap()
        }
    }

    /// Writes canned output into the capture files and exits with `code`.
    struct FakeShell {
        stdout: &'static str,
        stderr: &'static str,
        code: i32,
        spawned: AtomicUsize,
        last: Mutex<Option<CommandLine>>,
    }

    impl FakeShell {
        fn new(stdout: &'static str, stderr: &'static str, code: i32) -> Self {
            Self { stdout, stderr, code, spawned: AtomicUsize::new(0), last: Mutex::new(None) }
        }
    }

    struct FakeProcess(i32);

    impl RunningProcess for FakeProcess {
        fn id(&self) -> u32 {
            4242
        }

        fn wait(&mut self) -> io::Result<i32> {
            Ok(self.0)
        }
    }

    impl ShellExecutor for FakeShell {
        fn spawn(
            &self,
            command: &CommandLine,
            mut stdout: File,
            mut stderr: File,
        ) -> io::Result<Box<dyn RunningProcess>> {
            self.spawned.fetch_add(1, Ordering::SeqCst);
            *self.last.lock().unwrap() = Some(command.clone());
            stdout.write_all(self.stdout.as_bytes())?;
            stderr.write_all(self.stderr.as_bytes())?;
            Ok(Box::new(FakeProcess(self.code)))
        }
    }

    struct BrokenShell;

    impl ShellExecutor for BrokenShell {
        fn spawn(&self, _: &CommandLine, _: File, _: File) -> io::Result<Box<dyn RunningProcess>> {
            Err(io::Error::new(io::ErrorKind::NotFound, "no shell here"))
        }
    }

    #[test]
    fn printf_hello_is_captured() {
        let dir = scratch("printf_hello");
        let shell = LiveShellExecutor::default();
        let log = LogContext::disabled();
        let runner = CommandRunner::new(&shell, &LiveClock, &log);

        let result = runner.run(&ExecutionRequest::shell("printf hello", &dir)).unwrap();

        assert_eq!(result.exit_status, 0);
        assert!(result.process_id > 0);
        assert_eq!(result.stdout_path, dir.join("devkit.stdout"));
        assert_eq!(result.stderr_path, dir.join("devkit.stderr"));
        assert_eq!(std::fs::read_to_string(&result.stdout_path).unwrap(), "hello");
        assert_eq!(std::fs::read_to_string(&result.stderr_path).unwrap(), "");
        assert!(result.finished_at >= result.started_at);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn separates_stdout_and_stderr() {
        let dir = scratch("split_streams");
        let shell = LiveShellExecutor::default();
        let log = LogContext::disabled();
        let runner = CommandRunner::new(&shell, &LiveClock, &log);

        let result = runner.run(&ExecutionRequest::shell("echo out; echo err 1>&2", &dir)).unwrap();

        assert_eq!(std::fs::read_to_string(&result.stdout_path).unwrap(), "out\n");
        assert_eq!(std::fs::read_to_string(&result.stderr_path).unwrap(), "err\n");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn nonzero_exit_is_an_error() {
        let dir = scratch("exit_3");
        let shell = LiveShellExecutor::default();
        let log = LogContext::disabled();
        let runner = CommandRunner::new(&shell, &LiveClock, &log);

        let err = runner.run(&ExecutionRequest::shell("exit 3", &dir)).unwrap_err();

        match err {
            RunError::NonZeroExit { exit_status, process_id, stdout_path, stderr_path, .. } => {
                assert_eq!(exit_status, 3);
                assert!(process_id > 0);
                assert!(stdout_path.exists());
                assert!(stderr_path.exists());
            }
            other => panic!("expected NonZeroExit, got {other:?}"),
        }

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn stale_capture_files_are_replaced() {
        let dir = scratch("stale");
        let shell = LiveShellExecutor::default();
        let log = LogContext::disabled();
        let runner = CommandRunner::new(&shell, &LiveClock, &log);

        runner.run(&ExecutionRequest::shell("echo first; echo first >&2", &dir)).unwrap();
        let err = runner.run(&ExecutionRequest::shell("exit 1", &dir)).unwrap_err();
        assert!(matches!(err, RunError::NonZeroExit { exit_status: 1, .. }));

        assert_eq!(std::fs::read_to_string(dir.join("devkit.stdout")).unwrap(), "");
        assert_eq!(std::fs::read_to_string(dir.join("devkit.stderr")).unwrap(), "");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn creates_missing_output_directory() {
        let dir = scratch("missing_dir").join("a").join("b");
        let shell = LiveShellExecutor::default();
        let log = LogContext::disabled();
        let runner = CommandRunner::new(&shell, &LiveClock, &log);

        runner.run(&ExecutionRequest::shell("true", &dir)).unwrap();
        runner.run(&ExecutionRequest::shell("true", &dir)).unwrap();

        assert!(dir.join("devkit.stdout").is_file());
        assert!(dir.join("devkit.stderr").is_file());

        let _ = std::fs::remove_dir_all(scratch("missing_dir"));
    }

    #[test]
    fn empty_command_spawns_nothing() {
        let dir = scratch("empty_command");
        let shell = FakeShell::new("", "", 0);
        let log = LogContext::disabled();
        let runner = CommandRunner::new(&shell, &FixedClock, &log);

        let err = runner.run(&ExecutionRequest::shell("  ", &dir)).unwrap_err();

        assert!(matches!(err, RunError::EmptyCommand));
        assert_eq!(shell.spawned.load(Ordering::SeqCst), 0);
        assert!(!dir.exists());
    }

    #[test]
    fn honours_path_overrides_and_basename() {
        let dir = scratch("overrides");
        let shell = FakeShell::new("o", "e", 0);
        let log = LogContext::disabled();
        let runner = CommandRunner::new(&shell, &FixedClock, &log).with_basename("ssh-key");

        let request = ExecutionRequest::argv(["ssh-keygen"], &dir)
            .with_stdout_path(dir.join("custom").join("keygen.out"));
        let result = runner.run(&request).unwrap();

        assert_eq!(result.stdout_path, dir.join("custom").join("keygen.out"));
        assert_eq!(result.stderr_path, dir.join("ssh-key.stderr"));
        assert_eq!(std::fs::read_to_string(&result.stdout_path).unwrap(), "o");
        assert_eq!(result.process_id, 4242);
        assert_eq!(result.started_at, FixedClock.now());
        assert_eq!(
            shell.last.lock().unwrap().clone(),
            Some(CommandLine::Argv(vec!["ssh-keygen".into()]))
        );

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn shared_capture_path_holds_both_streams() {
        let dir = scratch("shared_path");
        let shell = FakeShell::new("out\n", "err\n", 0);
        let log = LogContext::disabled();
        let runner = CommandRunner::new(&shell, &FixedClock, &log);

        let both = dir.join("combined.log");
        let request = ExecutionRequest::shell("anything", &dir)
            .with_stdout_path(&both)
            .with_stderr_path(&both);
        runner.run(&request).unwrap();

        assert_eq!(std::fs::read_to_string(&both).unwrap(), "out\nerr\n");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn differently_spelled_shared_path_holds_both_streams() {
        let dir = scratch("shared_spelling");
        let shell = LiveShellExecutor::default();
        let log = LogContext::disabled();
        let runner = CommandRunner::new(&shell, &LiveClock, &log);

        let request = ExecutionRequest::shell("echo out; echo err >&2", &dir)
            .with_stdout_path(dir.join("both.log"))
            .with_stderr_path(dir.join("sub").join("..").join("both.log"));
        runner.run(&request).unwrap();

        let content = std::fs::read_to_string(dir.join("both.log")).unwrap();
        assert_eq!(content, "out\nerr\n");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_shared_path_holds_both_streams() {
        let dir = scratch("shared_symlink");
        std::fs::create_dir_all(dir.join("real")).unwrap();
        std::os::unix::fs::symlink(dir.join("real"), dir.join("link")).unwrap();
        let shell = FakeShell::new("out\n", "err\n", 0);
        let log = LogContext::disabled();
        let runner = CommandRunner::new(&shell, &FixedClock, &log);

        let request = ExecutionRequest::shell("anything", &dir)
            .with_stdout_path(dir.join("real").join("both.log"))
            .with_stderr_path(dir.join("link").join("both.log"));
        runner.run(&request).unwrap();

        let content = std::fs::read_to_string(dir.join("real").join("both.log")).unwrap();
        assert_eq!(content, "out\nerr\n");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn zero_preview_bytes_keeps_output_out_of_the_log() {
        let dir = scratch("no_preview");
        let shell = FakeShell::new("hello\n", "oops\n", 0);
        let log = LogContext::init(&dir.join("devkit.log"), LevelFilter::INFO).unwrap();
        let runner = CommandRunner::new(&shell, &FixedClock, &log).with_preview_bytes(0);

        runner.run(&ExecutionRequest::shell("echo hello", dir.join("run"))).unwrap();

        let content = std::fs::read_to_string(dir.join("devkit.log")).unwrap();
        assert!(content.contains("The return code was '0'"));
        assert!(!content.contains("stdout is:"));
        assert!(!content.contains("stderr is:"));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn long_output_is_truncated_in_the_log() {
        let dir = scratch("truncated_preview");
        let shell = FakeShell::new("abcdef\n", "xy", 0);
        let log = LogContext::init(&dir.join("devkit.log"), LevelFilter::INFO).unwrap();
        let runner = CommandRunner::new(&shell, &FixedClock, &log).with_preview_bytes(3);

        runner.run(&ExecutionRequest::shell("anything", dir.join("run"))).unwrap();

        let content = std::fs::read_to_string(dir.join("devkit.log")).unwrap();
        assert!(content.contains("stdout is: abc [truncated]"));
        assert!(!content.contains("abcdef"));
        assert!(content.lines().any(|l| l.ends_with("stderr is: xy")));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn spawn_failure_is_typed() {
        let dir = scratch("spawn_failure");
        let log = LogContext::disabled();
        let runner = CommandRunner::new(&BrokenShell, &FixedClock, &log);

        let err = runner.run(&ExecutionRequest::shell("true", &dir)).unwrap_err();

        assert!(matches!(err, RunError::Spawn { .. }));
        assert!(dir.join("devkit.stdout").is_file());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn unusable_output_directory_is_a_filesystem_error() {
        let dir = scratch("blocked");
        std::fs::create_dir_all(&dir).unwrap();
        let blocker = dir.join("file");
        std::fs::write(&blocker, "not a directory").unwrap();
        let shell = FakeShell::new("", "", 0);
        let log = LogContext::disabled();
        let runner = CommandRunner::new(&shell, &FixedClock, &log);

        let err = runner.run(&ExecutionRequest::shell("true", blocker.join("out"))).unwrap_err();

        assert!(matches!(err, RunError::Filesystem { .. }));
        assert_eq!(shell.spawned.load(Ordering::SeqCst), 0);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn logs_command_pid_status_and_output() {
        let dir = scratch("logged");
        let shell = FakeShell::new("hello\n", "", 0);
        let log = LogContext::init(&dir.join("devkit.log"), LevelFilter::INFO).unwrap();
        let runner = CommandRunner::new(&shell, &FixedClock, &log);

        runner.run(&ExecutionRequest::shell("echo hello", dir.join("run"))).unwrap();

        let content = std::fs::read_to_string(dir.join("devkit.log")).unwrap();
        assert!(content.contains("Will attempt to execute 'echo hello'"));
        assert!(content.contains("The child process ID is '4242'"));
        assert!(content.contains("The return code was '0'"));
        assert!(content.contains("stdout is: hello"));
        assert!(!content.contains("stderr is:"));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn failure_is_logged_as_error() {
        let dir = scratch("logged_failure");
        let shell = FakeShell::new("", "boom\n", 2);
        let log = LogContext::init(&dir.join("devkit.log"), LevelFilter::INFO).unwrap();
        let runner = CommandRunner::new(&shell, &FixedClock, &log);

        let _ = runner.run(&ExecutionRequest::shell("false", dir.join("run")));

        let content = std::fs::read_to_string(dir.join("devkit.log")).unwrap();
        assert!(content.contains("stderr is: boom"));
        assert!(content.lines().any(|l| l.starts_with("ERROR : ") && l.contains("status 2")));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn read_prefix_reports_truncation() {
        let dir = scratch("prefix");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("big");
        std::fs::write(&path, "abcdef").unwrap();

        assert_eq!(read_prefix(&path, 3).unwrap(), ("abc".to_string(), true));
        assert_eq!(read_prefix(&path, 6).unwrap(), ("abcdef".to_string(), false));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
