//! Run the engine as a subprocess.
//!
//! The engine counts increments from 1, while our time steps count
//! from 0 (the initial state), so iteration bounds are shifted by one
//! on the way out. A configured maximum runtime is enforced by an
//! external `timeout` wrapper; an engine killed that way leaves its
//! partial output behind for the reader to sort out.

use std::fmt;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

use tempo_tracer::*;

use crate::stage::{QueryDirectory, Stage};
use crate::EngineError;

/// How to run the engine, and which background files it reads.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EngineConfig {
    pub executable: PathBuf,

    /// Maximum wall-clock seconds per run, 0 for unlimited.
    pub max_time: u32,

    /// Whether a `timeout` utility may wrap the engine. Without one,
    /// `max_time` is ignored.
    pub timeout_available: bool,

    /// Background files shared by every query.
    pub link_files: Vec<PathBuf>,

    /// Background files each query may modify, staged on request.
    pub copy_files: Vec<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            executable: PathBuf::from("clingo"),
            max_time: 0,
            timeout_available: false,
            link_files: vec![],
            copy_files: vec![],
        }
    }
}

/// One run of the engine.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SolveRequest<'a> {
    pub program: &'a str,
    pub initial_step: u32,
    pub final_step: u32,

    /// Names the program and output files.
    pub label: &'a str,

    /// How many answers to ask for; 0 means all of them.
    pub answers: u32,
    pub use_copy_files: bool,
}

/// What the engine printed, and where it was captured.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Transcript {
    pub output_path: PathBuf,
    pub text: String,
}

/// A solving engine behind a request/response contract.
pub trait Engine {
    fn solve(&self, request: &SolveRequest<'_>) -> Result<Transcript, EngineError>;
}

/// A complete engine invocation. Displays as the equivalent shell command.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CommandLine {
    pub timeout: Option<u32>,
    pub executable: PathBuf,

    /// Engine iteration bounds (already shifted).
    pub cimin: u32,
    pub cimax: u32,
    pub files: Vec<PathBuf>,
    pub program: PathBuf,
    pub output: PathBuf,
    pub answers: u32,
}

impl CommandLine {
    fn engine_args(&self) -> Vec<String> {
        let mut args = vec![
            String::from("--warn"),
            String::from("no-atom-undefined"),
            format!("-cimin={}", self.cimin),
            format!("-cimax={}", self.cimax),
        ];
        args.extend(self.files.iter().map(|f| f.display().to_string()));
        args.push(self.program.display().to_string());
        args.push(self.answers.to_string());
        args
    }

    /// The process to spawn; output redirection is left to the caller.
    pub fn command(&self) -> Command {
        let mut command = match self.timeout {
            Some(seconds) => {
                let mut command = Command::new("timeout");
                command.arg(seconds.to_string()).arg(&self.executable);
                command
            }
            None => Command::new(&self.executable),
        };
        command.args(self.engine_args());
        command
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(seconds) = self.timeout {
            f.write_fmt(format_args!("timeout {seconds} "))?;
        }
        let mut args = self.engine_args();
        let answers = args.pop().unwrap_or_default();
        f.write_fmt(format_args!(
            "{} {} > {} {answers}",
            self.executable.display(),
            args.join(" "),
            self.output.display(),
        ))
    }
}

/// Does an exit status report a failure to run, rather than an outcome?
/// The engine exits with a bitmask of outcomes (1 interrupted, 10
/// satisfiable, 20 exhausted), and `timeout` with 124 when it fired.
fn failed(status: &ExitStatus) -> bool {
    match status.code() {
        None => true,
        Some(code) => matches!(code, 33 | 65 | 126 | 127 | 128),
    }
}

/// The `clingo` engine, run in a staged query directory.
#[derive(Clone, Debug)]
pub struct ClingoEngine<S = QueryDirectory> {
    config: EngineConfig,
    stager: S,
    trace: Trace,
}

impl<S: Stage> ClingoEngine<S> {
    pub fn new(config: EngineConfig, stager: S, trace: Trace) -> Self {
        Self {
            config,
            stager,
            trace,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn timeout(&self) -> Option<u32> {
        let EngineConfig {
            max_time,
            timeout_available,
            ..
        } = self.config;
        (timeout_available && max_time > 0).then_some(max_time)
    }

    /// Build the command line for a request staged in `dir`.
    pub fn command_line(
        &self,
        request: &SolveRequest<'_>,
        dir: &Path,
        files: Vec<PathBuf>,
    ) -> CommandLine {
        CommandLine {
            timeout: self.timeout(),
            executable: self.config.executable.clone(),
            cimin: request.initial_step.saturating_add(1),
            cimax: request.final_step.saturating_add(1),
            files,
            program: dir.join(format!("{}.asp", request.label)),
            output: dir.join(format!("{}_output.txt", request.label)),
            answers: request.answers,
        }
    }
}

impl<S: Stage> Engine for ClingoEngine<S> {
    fn solve(&self, request: &SolveRequest<'_>) -> Result<Transcript, EngineError> {
        let copy_files: &[PathBuf] = if request.use_copy_files {
            &self.config.copy_files
        } else {
            &[]
        };
        let staged = self
            .stager
            .stage(&self.config.link_files, copy_files)
            .map_err(EngineError::Stage)?;
        trace!(
            self.trace,
            Invoke,
            "Staged {} background file(s) in {}",
            staged.files.len(),
            staged.path.display()
        );

        let command_line = self.command_line(request, &staged.path, staged.files);
        fs::write(&command_line.program, format!("{}\n", request.program)).map_err(|source| {
            EngineError::WriteProgram {
                path: command_line.program.clone(),
                source,
            }
        })?;

        trace!(self.trace, Invoke, "Running {}", command_line);
        let output = File::create(&command_line.output).map_err(|source| {
            EngineError::Output {
                path: command_line.output.clone(),
                source,
            }
        })?;
        let status = command_line
            .command()
            .stdout(output)
            .status()
            .map_err(|source| EngineError::Spawn {
                command: command_line.to_string(),
                source,
            })?;
        trace!(self.trace, Invoke, "Engine exited with {}", status);
        if failed(&status) {
            return Err(EngineError::Failed {
                command: command_line.to_string(),
                status,
            });
        }

        let text = fs::read_to_string(&command_line.output).map_err(|source| {
            EngineError::Output {
                path: command_line.output.clone(),
                source,
            }
        })?;
        Ok(Transcript {
            output_path: command_line.output,
            text,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn request(program: &str) -> SolveRequest<'_> {
        SolveRequest {
            program,
            initial_step: 0,
            final_step: 4,
            label: "planQuery",
            answers: 3,
            use_copy_files: true,
        }
    }

    #[test]
    fn command_line() {
        let engine = ClingoEngine::new(
            EngineConfig::default(),
            QueryDirectory::new("/tmp/q"),
            Trace::none(),
        );
        let line = engine.command_line(
            &request(""),
            Path::new("/tmp/q"),
            vec![PathBuf::from("/tmp/q/domain.asp")],
        );
        assert_eq!(line.cimin, 1);
        assert_eq!(line.cimax, 5);
        assert_eq!(
            line.to_string(),
            "clingo --warn no-atom-undefined -cimin=1 -cimax=5 /tmp/q/domain.asp \
             /tmp/q/planQuery.asp > /tmp/q/planQuery_output.txt 3"
        );
    }

    #[test]
    fn timeout_wrapper() {
        let config = |max_time, timeout_available| EngineConfig {
            max_time,
            timeout_available,
            ..EngineConfig::default()
        };
        let line = |config| {
            ClingoEngine::new(config, QueryDirectory::new("/q"), Trace::none())
                .command_line(&request(""), Path::new("/q"), vec![])
                .to_string()
        };
        assert!(line(config(30, true)).starts_with("timeout 30 clingo --warn"));
        assert!(line(config(30, false)).starts_with("clingo --warn"));
        assert!(line(config(0, true)).starts_with("clingo --warn"));
    }

    #[cfg(unix)]
    #[test]
    fn failed_statuses() {
        use std::os::unix::process::ExitStatusExt;

        let exit = |code: i32| ExitStatus::from_raw(code << 8);
        for code in [0, 1, 10, 20, 30, 124] {
            assert!(!failed(&exit(code)), "{code} is an outcome");
        }
        for code in [33, 65, 126, 127, 128] {
            assert!(failed(&exit(code)), "{code} is a failure");
        }
        assert!(failed(&ExitStatus::from_raw(9)), "killed by a signal");
    }

    #[cfg(unix)]
    #[test]
    fn solve() {
        // `echo` stands in for the engine and prints its arguments.
        let work = tempfile::tempdir().unwrap();
        let engine = ClingoEngine::new(
            EngineConfig {
                executable: PathBuf::from("echo"),
                ..EngineConfig::default()
            },
            QueryDirectory::new(work.path()),
            Trace::none(),
        );
        let transcript = engine.solve(&request("a.")).unwrap();
        let program = work.path().join("planQuery.asp");
        assert_eq!(
            transcript.output_path,
            work.path().join("planQuery_output.txt")
        );
        assert_eq!(
            transcript.text,
            format!(
                "--warn no-atom-undefined -cimin=1 -cimax=5 {} 3\n",
                program.display()
            )
        );
        assert_eq!(fs::read_to_string(program).unwrap(), "a.\n");
    }

    #[cfg(unix)]
    #[test]
    fn engine_error_status() {
        use std::os::unix::fs::PermissionsExt;

        let work = tempfile::tempdir().unwrap();
        let script = work.path().join("broken-engine");
        fs::write(&script, "#!/bin/sh\necho '*** ERROR: parsing failed'\nexit 65\n").unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
        let engine = ClingoEngine::new(
            EngineConfig {
                executable: script,
                ..EngineConfig::default()
            },
            QueryDirectory::new(work.path().join("query")),
            Trace::none(),
        );
        match engine.solve(&request("a.")) {
            Err(EngineError::Failed { status, .. }) => assert_eq!(status.code(), Some(65)),
            other => panic!("expected a failed run, got {other:?}"),
        }
    }

    #[test]
    fn missing_engine() {
        let work = tempfile::tempdir().unwrap();
        let engine = ClingoEngine::new(
            EngineConfig {
                executable: work.path().join("no-such-engine"),
                ..EngineConfig::default()
            },
            QueryDirectory::new(work.path()),
            Trace::none(),
        );
        assert!(matches!(
            engine.solve(&request("a.")),
            Err(EngineError::Spawn { .. })
        ));
    }
}
