use std::{
    fs, io,
    path::PathBuf,
    process::{Child, Command, Stdio},
};

use crate::{
    backend_output::{self, OutputRing, OutputStream},
    launch_plan::LaunchPlan,
    process_control, BACKEND_AUTO_START_ENV, BACKEND_OUTPUT_RING_LINES,
};

#[derive(Debug, thiserror::Error)]
pub(crate) enum LaunchError {
    #[error("backend auto-start is disabled ({}=0)", BACKEND_AUTO_START_ENV)]
    AutoStartDisabled,
    #[error("backend launch plan is invalid: {0}")]
    InvalidPlan(String),
    #[error("backend executable is missing: {}", path.display())]
    MissingExecutable { path: PathBuf },
    #[error("backend process was already started once; create a new instance")]
    AlreadyStarted,
    #[error("application is shutting down")]
    ShuttingDown,
    #[error("failed to spawn backend process {command:?}: {source}")]
    Spawn {
        command: Vec<String>,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BackendStatus {
    NotStarted,
    Running,
    Exited,
    Killed,
}

impl BackendStatus {
    /// NotStarted -> Running -> {Exited, Killed}; nothing leaves a terminal state.
    pub(crate) fn can_transition_to(self, next: BackendStatus) -> bool {
        matches!(
            (self, next),
            (BackendStatus::NotStarted, BackendStatus::Running)
                | (BackendStatus::Running, BackendStatus::Exited)
                | (BackendStatus::Running, BackendStatus::Killed)
        )
    }
}

#[derive(Debug)]
enum ProcessLifecycle {
    NotStarted,
    Running(Child),
    Exited(Option<i32>),
    Killed,
}

impl ProcessLifecycle {
    fn status(&self) -> BackendStatus {
        match self {
            Self::NotStarted => BackendStatus::NotStarted,
            Self::Running(_) => BackendStatus::Running,
            Self::Exited(_) => BackendStatus::Exited,
            Self::Killed => BackendStatus::Killed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum StopOutcome {
    NotRunning(BackendStatus),
    AlreadyExited(Option<i32>),
    Killed,
    KillFailed(String),
}

/// One launch of the backend executable. A process that has left `Running`
/// cannot be started again.
#[derive(Debug)]
pub(crate) struct BackendProcess {
    plan: LaunchPlan,
    lifecycle: ProcessLifecycle,
    pid: Option<u32>,
    output: OutputRing,
}

impl BackendProcess {
    pub(crate) fn new(plan: LaunchPlan) -> Self {
        Self {
            plan,
            lifecycle: ProcessLifecycle::NotStarted,
            pid: None,
            output: OutputRing::new(BACKEND_OUTPUT_RING_LINES),
        }
    }

    pub(crate) fn plan(&self) -> &LaunchPlan {
        &self.plan
    }

    pub(crate) fn status(&self) -> BackendStatus {
        self.lifecycle.status()
    }

    pub(crate) fn pid(&self) -> Option<u32> {
        self.pid
    }

    pub(crate) fn output_tail(&self) -> Vec<String> {
        self.output.snapshot()
    }

    fn transition(&mut self, next: ProcessLifecycle) -> bool {
        if !self.status().can_transition_to(next.status()) {
            return false;
        }
        self.lifecycle = next;
        true
    }

    pub(crate) fn start<F>(&mut self, log: F) -> Result<u32, LaunchError>
    where
        F: Fn(&str) + Clone + Send + 'static,
    {
        if self.status() != BackendStatus::NotStarted {
            return Err(LaunchError::AlreadyStarted);
        }
        if self.plan.has_explicit_path() && !self.plan.program.is_file() {
            return Err(LaunchError::MissingExecutable {
                path: self.plan.program.clone(),
            });
        }
        if !self.plan.cwd.exists() {
            fs::create_dir_all(&self.plan.cwd).map_err(|error| {
                LaunchError::InvalidPlan(format!(
                    "failed to create working directory {}: {}",
                    self.plan.cwd.display(),
                    error
                ))
            })?;
        }

        let mut command = Command::new(&self.plan.program);
        command
            .args(&self.plan.args)
            .current_dir(&self.plan.cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        process_control::configure_background_command(&mut command);

        let mut child = command.spawn().map_err(|source| LaunchError::Spawn {
            command: self.plan.debug_command(),
            source,
        })?;
        let pid = child.id();

        if let Some(stdout) = child.stdout.take() {
            let _ = backend_output::spawn_output_capture(
                stdout,
                OutputStream::Stdout,
                self.output.clone(),
                log.clone(),
            );
        }
        if let Some(stderr) = child.stderr.take() {
            let _ = backend_output::spawn_output_capture(
                stderr,
                OutputStream::Stderr,
                self.output.clone(),
                log,
            );
        }

        self.pid = Some(pid);
        self.transition(ProcessLifecycle::Running(child));
        Ok(pid)
    }

    /// Polls the OS and records an exit the process made on its own.
    pub(crate) fn refresh_status(&mut self) -> BackendStatus {
        let exited = match &mut self.lifecycle {
            ProcessLifecycle::Running(child) => match child.try_wait() {
                Ok(Some(status)) => Some(status.code()),
                Ok(None) | Err(_) => None,
            },
            _ => None,
        };
        if let Some(code) = exited {
            self.transition(ProcessLifecycle::Exited(code));
        }
        self.status()
    }

    /// Idempotent. Kills the whole process tree when the backend is still
    /// running; otherwise does nothing.
    pub(crate) fn stop(&mut self) -> StopOutcome {
        if self.refresh_status() != BackendStatus::Running {
            return match &self.lifecycle {
                ProcessLifecycle::Exited(code) => StopOutcome::AlreadyExited(*code),
                other => StopOutcome::NotRunning(other.status()),
            };
        }

        let ProcessLifecycle::Running(mut child) =
            std::mem::replace(&mut self.lifecycle, ProcessLifecycle::Killed)
        else {
            return StopOutcome::NotRunning(self.status());
        };

        match process_control::kill_process_tree(&mut child) {
            Ok(()) => StopOutcome::Killed,
            Err(error) => StopOutcome::KillFailed(error),
        }
    }
}

impl Drop for BackendProcess {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}
