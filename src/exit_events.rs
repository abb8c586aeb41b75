use tauri::{AppHandle, Manager};

use crate::{append_shutdown_log, backend_process::StopOutcome, BackendState};

/// Stops the backend tree synchronously. Safe to call from every shutdown
/// hook; only the first call logs the shutdown start.
pub(crate) fn shutdown_backend(app_handle: &AppHandle, reason: &str) {
    let Some(state) = app_handle.try_state::<BackendState>() else {
        return;
    };
    if state.mark_shutting_down() {
        append_shutdown_log(&format!("shutdown requested: {reason}"));
    }

    match state.stop_backend() {
        StopOutcome::Killed => append_shutdown_log("backend process tree killed"),
        StopOutcome::KillFailed(error) => {
            append_shutdown_log(&format!("backend kill failed, continuing exit: {error}"))
        }
        StopOutcome::AlreadyExited(code) => {
            append_shutdown_log(&format!("backend already exited: code={code:?}"))
        }
        StopOutcome::NotRunning(_) => {}
    }
}

pub(crate) fn handle_exit_requested(app_handle: &AppHandle) {
    shutdown_backend(app_handle, "exit requested");
}

pub(crate) fn handle_exit_event(app_handle: &AppHandle) {
    shutdown_backend(app_handle, "exit");
    append_shutdown_log("desktop process exiting");
}
