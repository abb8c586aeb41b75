use std::thread;

use tauri::{AppHandle, Manager};

use crate::{
    append_backend_log, append_startup_log,
    backend_process::LaunchError,
    backend_readiness::{HealthCheckResult, HealthProber, HttpProbe, SystemClock},
    boot_sequence::{BootEnvironment, BootOutcome, BootPhase, BootSequencer},
    launch_plan::{self, LaunchPlanResolution},
    main_window, ui_dispatch, BackendState,
};

struct TauriBootEnvironment {
    app_handle: AppHandle,
}

impl TauriBootEnvironment {
    fn state(&self) -> tauri::State<'_, BackendState> {
        self.app_handle.state::<BackendState>()
    }
}

impl BootEnvironment for TauriBootEnvironment {
    fn start_backend(&self) -> Result<u32, LaunchError> {
        let plan = match launch_plan::resolve_launch_plan().map_err(LaunchError::InvalidPlan)? {
            LaunchPlanResolution::Launch(plan) => plan,
            LaunchPlanResolution::AutoStartDisabled => return Err(LaunchError::AutoStartDisabled),
        };
        append_startup_log(&format!(
            "launching backend: {:?} cwd={} packaged={}",
            plan.debug_command(),
            plan.cwd.display(),
            plan.packaged_mode
        ));
        self.state().start_backend(plan, append_backend_log)
    }

    fn wait_for_health(&self) -> HealthCheckResult {
        let state = self.state();
        let config = &state.config;
        HealthProber::new(SystemClock, HttpProbe, config.probe_timeout)
            .with_cancel(state.shutdown_flag())
            .wait_ready(
                &config.health_url,
                config.backend_timeout,
                config.poll_interval,
                append_startup_log,
            )
    }

    fn is_shutting_down(&self) -> bool {
        self.state().is_shutting_down()
    }

    fn embed(&self, outcome: BootOutcome) -> Result<(), String> {
        let backend_url = self.state().config.backend_url.clone();
        ui_dispatch::run_on_main_thread_dispatch(
            &self.app_handle,
            "embed renderer",
            move |main_app| main_window::embed_renderer(main_app, &backend_url, outcome),
        )
    }

    fn log(&self, message: &str) {
        append_startup_log(message);
    }

    fn phase_changed(&self, phase: BootPhase) {
        self.state().set_boot_phase(phase);
    }
}

/// Runs the boot sequence on its own thread. Never joined: shutdown only
/// signals it through the shared flag.
pub(crate) fn spawn_startup_task(app_handle: AppHandle) {
    if !app_handle.state::<BackendState>().try_begin_boot() {
        append_startup_log("boot sequence already started; ignoring");
        return;
    }

    let spawn_result = thread::Builder::new()
        .name("boot-sequence".to_string())
        .spawn(move || {
            let env = TauriBootEnvironment { app_handle };
            match BootSequencer::default().run(&env) {
                Ok(report) => {
                    if let Some(error) = &report.launch_error {
                        append_startup_log(&format!("backend launch failed: {error}"));
                    }
                    match &report.health {
                        Some(health) => append_startup_log(&format!(
                            "boot phases: {:?} ready={} attempts={} status={:?} at {}",
                            report.history,
                            health.ready,
                            health.attempts,
                            health.last_status,
                            health.observed_at.format("%Y-%m-%d %H:%M:%S%.3f")
                        )),
                        None => append_startup_log(&format!(
                            "boot phases: {:?} (no readiness check)",
                            report.history
                        )),
                    }
                }
                Err(error) => append_startup_log(&format!("boot sequence aborted: {error}")),
            }
        });
    if let Err(error) = spawn_result {
        append_startup_log(&format!("failed to spawn boot thread: {error}"));
    }
}
