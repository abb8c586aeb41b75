use tauri::{AppHandle, Manager};

use crate::{
    append_desktop_log,
    native_window::TauriWindowServices,
    window_chrome::{ChromeAction, WindowChrome},
    BackendDiagnostics, BackendState, ChromeCommandResult, MainWindowChrome,
};

fn run_chrome_command<F>(app_handle: &AppHandle, command: &str, action: F) -> ChromeCommandResult
where
    F: FnOnce(&mut WindowChrome<TauriWindowServices>) -> Result<(), String>,
{
    let Some(chrome) = app_handle.try_state::<MainWindowChrome>() else {
        return ChromeCommandResult::from(Err("Main window chrome is not ready.".to_string()));
    };

    let result = chrome.with_chrome(action);
    if let Err(error) = &result {
        append_desktop_log(&format!("{command} failed: {error}"));
    }
    ChromeCommandResult::from(result)
}

#[tauri::command]
pub(crate) fn chrome_drag_region_pressed(
    app_handle: AppHandle,
    click_count: u32,
) -> ChromeCommandResult {
    run_chrome_command(&app_handle, "chrome_drag_region_pressed", |chrome| {
        chrome.drag_region_pressed(click_count).map(|_| ())
    })
}

#[tauri::command]
pub(crate) fn chrome_resize_grip_pressed(app_handle: AppHandle) -> ChromeCommandResult {
    run_chrome_command(&app_handle, "chrome_resize_grip_pressed", |chrome| {
        if chrome.resize_grip_pressed()? == ChromeAction::ResizeIgnoredWhileMaximized {
            append_desktop_log("resize grip ignored while maximized");
        }
        Ok(())
    })
}

#[tauri::command]
pub(crate) fn chrome_minimize(app_handle: AppHandle) -> ChromeCommandResult {
    run_chrome_command(&app_handle, "chrome_minimize", |chrome| chrome.minimize())
}

#[tauri::command]
pub(crate) fn chrome_toggle_maximize(app_handle: AppHandle) -> ChromeCommandResult {
    run_chrome_command(&app_handle, "chrome_toggle_maximize", |chrome| {
        chrome.toggle_maximize().map(|_| ())
    })
}

#[tauri::command]
pub(crate) fn chrome_close(app_handle: AppHandle) -> ChromeCommandResult {
    run_chrome_command(&app_handle, "chrome_close", |chrome| chrome.close())
}

#[tauri::command]
pub(crate) fn chrome_reload(app_handle: AppHandle) -> ChromeCommandResult {
    run_chrome_command(&app_handle, "chrome_reload", |chrome| chrome.reload())
}

#[tauri::command]
pub(crate) fn chrome_open_devtools(app_handle: AppHandle) -> ChromeCommandResult {
    run_chrome_command(&app_handle, "chrome_open_devtools", |chrome| {
        chrome.open_devtools()
    })
}

/// Called by the overlay once mounted so the glyph matches the current state.
#[tauri::command]
pub(crate) fn chrome_sync_window_state(app_handle: AppHandle) -> ChromeCommandResult {
    run_chrome_command(&app_handle, "chrome_sync_window_state", |chrome| {
        chrome.sync_from_os()?;
        chrome.push_glyph()
    })
}

#[tauri::command]
pub(crate) fn desktop_get_backend_diagnostics(app_handle: AppHandle) -> BackendDiagnostics {
    let mut diagnostics = app_handle.state::<BackendState>().diagnostics();
    if let Some(chrome) = app_handle.try_state::<MainWindowChrome>() {
        chrome.with_chrome(|chrome| {
            let state = chrome.state();
            diagnostics.window_state = Some(state.window_state);
            diagnostics.resize_in_progress = state.resize_direction.is_some();
            diagnostics.backdrop_applied = chrome.applied_backdrop().is_some();
        });
    }
    diagnostics
}
