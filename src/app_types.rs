use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex, MutexGuard,
};

use crate::{
    append_desktop_log,
    backend_process::{BackendProcess, BackendStatus, LaunchError, StopOutcome},
    boot_sequence::BootPhase,
    launch_plan::LaunchPlan,
    native_window::{TauriWindowServices, WindowState},
    shell_config::ShellConfig,
    window_chrome::WindowChrome,
};

fn lock_or_recover<'a, T>(mutex: &'a Mutex<T>, context: &str) -> MutexGuard<'a, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(error) => {
            append_desktop_log(&format!("{context} lock poisoned: {error}"));
            error.into_inner()
        }
    }
}

/// Backend supervision state shared by the boot thread and the shutdown path.
#[derive(Debug)]
pub(crate) struct BackendState {
    pub(crate) config: ShellConfig,
    process: Mutex<Option<BackendProcess>>,
    boot_phase: Mutex<BootPhase>,
    boot_started: AtomicBool,
    shutting_down: Arc<AtomicBool>,
}

impl BackendState {
    pub(crate) fn new(config: ShellConfig) -> Self {
        Self {
            config,
            process: Mutex::new(None),
            boot_phase: Mutex::new(BootPhase::Idle),
            boot_started: AtomicBool::new(false),
            shutting_down: Arc::new(AtomicBool::new(false)),
        }
    }

    pub(crate) fn try_begin_boot(&self) -> bool {
        self.boot_started
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub(crate) fn set_boot_phase(&self, phase: BootPhase) {
        *lock_or_recover(&self.boot_phase, "boot phase") = phase;
    }

    pub(crate) fn boot_phase(&self) -> BootPhase {
        *lock_or_recover(&self.boot_phase, "boot phase")
    }

    pub(crate) fn shutdown_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutting_down)
    }

    pub(crate) fn is_shutting_down(&self) -> bool {
        self.shutting_down.load(Ordering::Acquire)
    }

    /// Returns true for the first caller only.
    pub(crate) fn mark_shutting_down(&self) -> bool {
        !self.shutting_down.swap(true, Ordering::AcqRel)
    }

    /// Starts the backend unless shutdown has begun. The process lock is held
    /// across the spawn so the shutdown path never misses a fresh child.
    pub(crate) fn start_backend<F>(&self, plan: LaunchPlan, log: F) -> Result<u32, LaunchError>
    where
        F: Fn(&str) + Clone + Send + 'static,
    {
        let mut guard = lock_or_recover(&self.process, "backend process");
        if self.is_shutting_down() {
            return Err(LaunchError::ShuttingDown);
        }
        if guard.is_some() {
            return Err(LaunchError::AlreadyStarted);
        }

        let process = guard.insert(BackendProcess::new(plan));
        process.start(log)
    }

    pub(crate) fn stop_backend(&self) -> StopOutcome {
        let mut guard = lock_or_recover(&self.process, "backend process");
        match guard.as_mut() {
            Some(process) => process.stop(),
            None => StopOutcome::NotRunning(BackendStatus::NotStarted),
        }
    }

    pub(crate) fn diagnostics(&self) -> BackendDiagnostics {
        let mut guard = lock_or_recover(&self.process, "backend process");
        let (status, pid, command, recent_output) = match guard.as_mut() {
            Some(process) => (
                process.refresh_status(),
                process.pid(),
                process.plan().debug_command(),
                process.output_tail(),
            ),
            None => (BackendStatus::NotStarted, None, Vec::new(), Vec::new()),
        };
        BackendDiagnostics {
            status: format!("{status:?}"),
            pid,
            command,
            boot_phase: format!("{:?}", self.boot_phase()),
            backend_url: self.config.backend_url.clone(),
            recent_output,
            window_state: None,
            resize_in_progress: false,
            backdrop_applied: false,
        }
    }
}

#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BackendDiagnostics {
    pub(crate) status: String,
    pub(crate) pid: Option<u32>,
    pub(crate) command: Vec<String>,
    pub(crate) boot_phase: String,
    pub(crate) backend_url: String,
    pub(crate) recent_output: Vec<String>,
    pub(crate) window_state: Option<WindowState>,
    pub(crate) resize_in_progress: bool,
    pub(crate) backdrop_applied: bool,
}

#[derive(Debug, serde::Serialize)]
pub(crate) struct ChromeCommandResult {
    pub(crate) ok: bool,
    pub(crate) reason: Option<String>,
}

impl From<Result<(), String>> for ChromeCommandResult {
    fn from(result: Result<(), String>) -> Self {
        match result {
            Ok(()) => Self {
                ok: true,
                reason: None,
            },
            Err(error) => Self {
                ok: false,
                reason: Some(error),
            },
        }
    }
}

/// Chrome controller for the `main` window, owned by the UI thread.
pub(crate) struct MainWindowChrome {
    chrome: Mutex<WindowChrome<TauriWindowServices>>,
}

impl MainWindowChrome {
    pub(crate) fn new(services: TauriWindowServices) -> Self {
        Self {
            chrome: Mutex::new(WindowChrome::new(services)),
        }
    }

    pub(crate) fn with_chrome<R>(
        &self,
        action: impl FnOnce(&mut WindowChrome<TauriWindowServices>) -> R,
    ) -> R {
        let mut guard = lock_or_recover(&self.chrome, "window chrome");
        action(&mut guard)
    }

    /// Native calls issued by a chrome command can re-enter the window event
    /// handler on the same thread; those notifications are skipped instead of
    /// blocking, since the command records the state it asserted.
    pub(crate) fn try_with_chrome<R>(
        &self,
        action: impl FnOnce(&mut WindowChrome<TauriWindowServices>) -> R,
    ) -> Option<R> {
        match self.chrome.try_lock() {
            Ok(mut guard) => Some(action(&mut guard)),
            Err(std::sync::TryLockError::Poisoned(error)) => {
                let mut guard = error.into_inner();
                Some(action(&mut guard))
            }
            Err(std::sync::TryLockError::WouldBlock) => None,
        }
    }
}
