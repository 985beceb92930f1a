//! Pairwise alignment through an external aligner.
//!
//! Alignment itself is not implemented here. An [`AlignmentBackend`] takes an
//! [`AlignmentConfig`] and two sequences and returns the aligner's output lines
//! verbatim. [`ExternalAligner`] is the backend that runs a command-line tool:
//!
//! ```text
//! <program> <mode> [--try-rc] [--hide-coords] --gap-open N --gap-extend N
//!           --line-width N [--use-0-based-coords] <query> <subject>
//! ```
//!
//! Exit status 0 means success with the alignment on stdout; anything else is
//! reported as [`AlignError::ExternalTool`] with the captured output attached.

use std::fmt;
use std::io::{self, Read};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{debug, warn};
use thiserror::Error;

use crate::session::{Session, SessionError};

/// Default name of the external aligner executable.
pub const DEFAULT_ALIGNER: &str = "seqpair";

/// How often a pending alignment checks whether the child has exited.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Alignment mode, passed to the aligner as its subcommand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlignmentMode {
    /// Best matching sub-region of both sequences
    Local,
    /// End gaps are free
    #[default]
    SemiGlobal,
    /// End-to-end alignment of both sequences
    Global,
}

impl AlignmentMode {
    /// Subcommand name understood by the aligner.
    pub fn as_str(&self) -> &'static str {
        match self {
            AlignmentMode::Local => "local",
            AlignmentMode::SemiGlobal => "semiglobal",
            AlignmentMode::Global => "global",
        }
    }
}

impl fmt::Display for AlignmentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options forwarded to the aligner.
///
/// Values are not validated here; the aligner rejects what it cannot use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlignmentConfig {
    pub mode: AlignmentMode,
    /// Also try the reverse complement of the subject
    pub try_reverse_complement: bool,
    /// Omit sequence coordinates from the output
    pub hide_coordinates: bool,
    pub gap_open_penalty: u32,
    pub gap_extend_penalty: u32,
    /// Alignment columns per output block
    pub line_width: u32,
    pub use_zero_based_coordinates: bool,
}

impl Default for AlignmentConfig {
    fn default() -> Self {
        Self {
            mode: AlignmentMode::SemiGlobal,
            try_reverse_complement: true,
            hide_coordinates: false,
            gap_open_penalty: 2,
            gap_extend_penalty: 1,
            line_width: 60,
            use_zero_based_coordinates: false,
        }
    }
}

/// Errors raised while aligning.
#[derive(Error, Debug)]
pub enum AlignError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("Failed to start aligner '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("I/O error while running aligner '{program}': {source}")]
    Io {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("Aligner '{program}' failed ({status}): {}", .stderr.trim_end())]
    ExternalTool {
        program: String,
        status: ExitStatus,
        stdout: Vec<String>,
        stderr: String,
    },

    #[error("Aligner '{program}' did not finish within {timeout:?}")]
    Timeout { program: String, timeout: Duration },
}

impl AlignError {
    /// Lines worth showing to the user: the error itself, then whatever the
    /// aligner printed.
    pub fn diagnostic_lines(&self) -> Vec<String> {
        match self {
            AlignError::ExternalTool {
                program,
                status,
                stdout,
                stderr,
            } => {
                let mut lines = vec![format!("Aligner '{}' failed ({})", program, status)];
                lines.extend(stderr.lines().map(str::to_owned));
                lines.extend(stdout.iter().cloned());
                lines
            }
            other => vec![other.to_string()],
        }
    }
}

/// Something that can align a query against a subject.
pub trait AlignmentBackend {
    /// Aligns `query` against `subject`, returning the result lines.
    fn run(
        &self,
        config: &AlignmentConfig,
        query: &str,
        subject: &str,
    ) -> Result<Vec<String>, AlignError>;
}

/// Aligns the session's query against its subject.
///
/// Fails with [`AlignError::Session`] if either slot is unset.
pub fn align<B: AlignmentBackend + ?Sized>(
    session: &Session,
    backend: &B,
    config: &AlignmentConfig,
) -> Result<Vec<String>, AlignError> {
    let (query, subject) = session.pair()?;
    backend.run(config, query, subject)
}

/// Backend that runs an external command-line aligner.
#[derive(Debug, Clone)]
pub struct ExternalAligner {
    program: String,
    /// Arguments placed before the mode (e.g. a script path for an interpreter)
    leading_args: Vec<String>,
    timeout: Option<Duration>,
}

impl Default for ExternalAligner {
    fn default() -> Self {
        Self::new(DEFAULT_ALIGNER)
    }
}

impl ExternalAligner {
    /// Creates a backend for the given executable, with no timeout.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            leading_args: Vec::new(),
            timeout: None,
        }
    }

    /// Adds arguments that precede the aligner's own arguments.
    pub fn with_leading_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.leading_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Kills the aligner if it runs longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Builds the aligner's arguments (excluding the program and leading args).
    pub fn command_args(config: &AlignmentConfig, query: &str, subject: &str) -> Vec<String> {
        let mut args = vec![config.mode.as_str().to_string()];
        if config.try_reverse_complement {
            args.push("--try-rc".to_string());
        }
        if config.hide_coordinates {
            args.push("--hide-coords".to_string());
        }
        args.push("--gap-open".to_string());
        args.push(config.gap_open_penalty.to_string());
        args.push("--gap-extend".to_string());
        args.push(config.gap_extend_penalty.to_string());
        args.push("--line-width".to_string());
        args.push(config.line_width.to_string());
        if config.use_zero_based_coordinates {
            args.push("--use-0-based-coords".to_string());
        }
        args.push(query.to_string());
        args.push(subject.to_string());
        args
    }

    /// Starts the aligner without waiting for it.
    pub fn spawn(
        &self,
        config: &AlignmentConfig,
        query: &str,
        subject: &str,
    ) -> Result<PendingAlignment, AlignError> {
        let args = Self::command_args(config, query, subject);
        debug!(
            "Running aligner: {} {} {}",
            self.program,
            self.leading_args.join(" "),
            args.join(" ")
        );

        let mut child = Command::new(&self.program)
            .args(&self.leading_args)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| AlignError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let stdout = child.stdout.take().map(drain);
        let stderr = child.stderr.take().map(drain);

        Ok(PendingAlignment {
            program: self.program.clone(),
            child,
            stdout,
            stderr,
            timeout: self.timeout,
            started: Instant::now(),
        })
    }
}

impl AlignmentBackend for ExternalAligner {
    fn run(
        &self,
        config: &AlignmentConfig,
        query: &str,
        subject: &str,
    ) -> Result<Vec<String>, AlignError> {
        self.spawn(config, query, subject)?.wait()
    }
}

type OutputReader = JoinHandle<io::Result<Vec<u8>>>;

/// Reads a child pipe to the end on its own thread so a full pipe cannot
/// stall the child.
fn drain<R: Read + Send + 'static>(mut pipe: R) -> OutputReader {
    thread::spawn(move || {
        let mut buf = Vec::new();
        pipe.read_to_end(&mut buf)?;
        Ok(buf)
    })
}

fn collect(reader: Option<OutputReader>) -> io::Result<Vec<u8>> {
    match reader {
        Some(handle) => handle
            .join()
            .unwrap_or_else(|_| Err(io::Error::new(io::ErrorKind::Other, "output reader panicked"))),
        None => Ok(Vec::new()),
    }
}

fn to_lines(bytes: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(bytes)
        .lines()
        .map(str::to_owned)
        .collect()
}

/// A running aligner process.
#[derive(Debug)]
pub struct PendingAlignment {
    program: String,
    child: Child,
    stdout: Option<OutputReader>,
    stderr: Option<OutputReader>,
    timeout: Option<Duration>,
    started: Instant,
}

impl PendingAlignment {
    /// Process id of the aligner.
    pub fn id(&self) -> u32 {
        self.child.id()
    }

    /// Blocks until the aligner exits (or the timeout expires) and returns
    /// its stdout lines.
    pub fn wait(mut self) -> Result<Vec<String>, AlignError> {
        let status = match self.poll_until_exit()? {
            Some(status) => status,
            None => {
                let timeout = self.timeout.unwrap_or_default();
                warn!(
                    "Aligner '{}' (pid {}) timed out after {:?}, killing it",
                    self.program,
                    self.id(),
                    timeout
                );
                let _ = self.child.kill();
                let _ = self.child.wait();
                // Reader threads are left to finish on their own: a grandchild
                // may still hold the pipes open.
                return Err(AlignError::Timeout {
                    program: self.program,
                    timeout,
                });
            }
        };

        let program = self.program;
        let io_err = |source: io::Error| AlignError::Io {
            program: program.clone(),
            source,
        };
        let stdout = collect(self.stdout).map_err(io_err)?;
        let stderr = collect(self.stderr).map_err(io_err)?;

        if status.success() {
            return Ok(to_lines(&stdout));
        }

        warn!("Aligner '{}' exited with {}", program, status);
        Err(AlignError::ExternalTool {
            program,
            status,
            stdout: to_lines(&stdout),
            stderr: String::from_utf8_lossy(&stderr).into_owned(),
        })
    }

    /// Returns `Some(status)` once the child exits, `None` on timeout.
    fn poll_until_exit(&mut self) -> Result<Option<ExitStatus>, AlignError> {
        loop {
            let polled = self.child.try_wait().map_err(|source| AlignError::Io {
                program: self.program.clone(),
                source,
            })?;
            if let Some(status) = polled {
                return Ok(Some(status));
            }
            if let Some(timeout) = self.timeout {
                if self.started.elapsed() >= timeout {
                    return Ok(None);
                }
            }
            thread::sleep(POLL_INTERVAL);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    /// Backend that records its inputs and echoes them back.
    #[derive(Default)]
    struct RecordingBackend {
        calls: RefCell<Vec<(AlignmentConfig, String, String)>>,
    }

    impl AlignmentBackend for RecordingBackend {
        fn run(
            &self,
            config: &AlignmentConfig,
            query: &str,
            subject: &str,
        ) -> Result<Vec<String>, AlignError> {
            self.calls
                .borrow_mut()
                .push((*config, query.to_string(), subject.to_string()));
            Ok(vec![query.to_string(), subject.to_string()])
        }
    }

    #[test]
    fn test_default_config() {
        let config = AlignmentConfig::default();
        assert_eq!(config.mode, AlignmentMode::SemiGlobal);
        assert!(config.try_reverse_complement);
        assert!(!config.hide_coordinates);
        assert_eq!(config.gap_open_penalty, 2);
        assert_eq!(config.gap_extend_penalty, 1);
        assert_eq!(config.line_width, 60);
        assert!(!config.use_zero_based_coordinates);
    }

    #[test]
    fn test_mode_names() {
        assert_eq!(AlignmentMode::Local.to_string(), "local");
        assert_eq!(AlignmentMode::SemiGlobal.to_string(), "semiglobal");
        assert_eq!(AlignmentMode::Global.to_string(), "global");
    }

    #[test]
    fn test_command_args_default() {
        let args = ExternalAligner::command_args(&AlignmentConfig::default(), "AC", "GT");
        assert_eq!(
            args,
            vec![
                "semiglobal", "--try-rc", "--gap-open", "2", "--gap-extend", "1",
                "--line-width", "60", "AC", "GT"
            ]
        );
    }

    #[test]
    fn test_command_args_all_flags() {
        let config = AlignmentConfig {
            mode: AlignmentMode::Local,
            try_reverse_complement: false,
            hide_coordinates: true,
            gap_open_penalty: 5,
            gap_extend_penalty: 3,
            line_width: 80,
            use_zero_based_coordinates: true,
        };
        let args = ExternalAligner::command_args(&config, "AAA", "CCC");
        assert_eq!(
            args,
            vec![
                "local", "--hide-coords", "--gap-open", "5", "--gap-extend", "3",
                "--line-width", "80", "--use-0-based-coords", "AAA", "CCC"
            ]
        );
    }

    #[test]
    fn test_align_uses_session_slots() {
        let mut session = Session::new();
        session.set_query("ACGT");
        session.set_subject("TTGA");
        let backend = RecordingBackend::default();
        let config = AlignmentConfig::default();

        let lines = align(&session, &backend, &config).unwrap();
        assert_eq!(lines, vec!["ACGT", "TTGA"]);
        assert_eq!(
            backend.calls.borrow().as_slice(),
            &[(config, "ACGT".to_string(), "TTGA".to_string())]
        );
    }

    #[test]
    fn test_align_fails_fast_on_missing_slot() {
        let mut session = Session::new();
        session.set_query("ACGT");
        let backend = RecordingBackend::default();

        let err = align(&session, &backend, &AlignmentConfig::default()).unwrap_err();
        assert!(matches!(err, AlignError::Session(SessionError::MissingSubject)));
        assert!(backend.calls.borrow().is_empty());
    }

    #[test]
    fn test_builder_settings() {
        let aligner = ExternalAligner::new("seqpair");
        assert_eq!(aligner.program(), "seqpair");
        assert_eq!(aligner.timeout(), None);

        let aligner = aligner.with_timeout(Duration::from_secs(30));
        assert_eq!(aligner.timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_missing_program_is_spawn_error() {
        let aligner = ExternalAligner::new("/nonexistent/seqpop-test-aligner");
        let err = aligner
            .run(&AlignmentConfig::default(), "A", "C")
            .unwrap_err();
        assert!(matches!(err, AlignError::Spawn { .. }));
    }

    #[test]
    fn test_timeout_diagnostics() {
        let err = AlignError::Timeout {
            program: "seqpair".to_string(),
            timeout: Duration::from_secs(1),
        };
        assert_eq!(err.diagnostic_lines().len(), 1);
    }

    #[cfg(unix)]
    mod process {
        use std::fs;
        use std::path::PathBuf;

        use tempfile::TempDir;

        use super::super::*;

        /// Writes a shell script to run as the aligner through `sh`.
        fn script(dir: &TempDir, body: &str) -> PathBuf {
            let path = dir.path().join("aligner.sh");
            fs::write(&path, body).unwrap();
            path
        }

        fn aligner_for(path: &PathBuf) -> ExternalAligner {
            ExternalAligner::new("sh").with_leading_args([path.to_string_lossy().into_owned()])
        }

        #[test]
        fn test_arguments_reach_the_tool() {
            let dir = tempfile::tempdir().unwrap();
            let path = script(&dir, "printf '%s\\n' \"$@\"\n");
            let config = AlignmentConfig {
                mode: AlignmentMode::Global,
                ..AlignmentConfig::default()
            };

            let lines = aligner_for(&path).run(&config, "ACGT", "AGGT").unwrap();
            assert_eq!(lines, ExternalAligner::command_args(&config, "ACGT", "AGGT"));
        }

        #[test]
        fn test_output_lines_verbatim() {
            let dir = tempfile::tempdir().unwrap();
            let path = script(
                &dir,
                "echo 'Score: 12'\necho '  1 ACGT-A 5'\necho '    || | '\necho '  1 AC-TTA 5'\n",
            );

            let lines = aligner_for(&path)
                .run(&AlignmentConfig::default(), "ACGTA", "ACTTA")
                .unwrap();
            assert_eq!(
                lines,
                vec!["Score: 12", "  1 ACGT-A 5", "    || | ", "  1 AC-TTA 5"]
            );
        }

        #[test]
        fn test_nonzero_exit_is_external_tool_error() {
            let dir = tempfile::tempdir().unwrap();
            let path = script(&dir, "echo partial\necho 'bad gap penalty' >&2\nexit 3\n");

            let err = aligner_for(&path)
                .run(&AlignmentConfig::default(), "A", "C")
                .unwrap_err();
            match &err {
                AlignError::ExternalTool {
                    status,
                    stdout,
                    stderr,
                    ..
                } => {
                    assert_eq!(status.code(), Some(3));
                    assert_eq!(stdout, &vec!["partial".to_string()]);
                    assert_eq!(stderr.trim_end(), "bad gap penalty");
                }
                other => panic!("unexpected error: {:?}", other),
            }

            let lines = err.diagnostic_lines();
            assert!(lines[0].starts_with("Aligner 'sh' failed"));
            assert_eq!(&lines[1..], &["bad gap penalty", "partial"]);
        }

        #[test]
        fn test_timeout_kills_the_tool() {
            let dir = tempfile::tempdir().unwrap();
            let path = script(&dir, "exec sleep 5\n");
            let aligner = aligner_for(&path).with_timeout(Duration::from_millis(100));

            let started = Instant::now();
            let err = aligner
                .run(&AlignmentConfig::default(), "A", "C")
                .unwrap_err();
            assert!(matches!(err, AlignError::Timeout { .. }));
            assert!(started.elapsed() < Duration::from_secs(4));
        }

        #[test]
        fn test_spawn_then_wait() {
            let dir = tempfile::tempdir().unwrap();
            let path = script(&dir, "echo done\n");

            let pending = aligner_for(&path)
                .spawn(&AlignmentConfig::default(), "A", "C")
                .unwrap();
            assert!(pending.id() > 0);
            assert_eq!(pending.wait().unwrap(), vec!["done"]);
        }

        #[test]
        fn test_large_output_does_not_block() {
            let dir = tempfile::tempdir().unwrap();
            let path = script(
                &dir,
                "i=0\nwhile [ $i -lt 5000 ]; do echo \"line $i ACGTACGTACGTACGTACGT\"; echo \"err $i\" >&2; i=$((i+1)); done\n",
            );

            let lines = aligner_for(&path)
                .with_timeout(Duration::from_secs(30))
                .run(&AlignmentConfig::default(), "A", "C")
                .unwrap();
            assert_eq!(lines.len(), 5000);
            assert_eq!(lines[4999], "line 4999 ACGTACGTACGTACGTACGT");
        }
    }
}
