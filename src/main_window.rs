use tauri::{App, AppHandle, Manager, WebviewWindow, WebviewWindowBuilder};
use tauri_plugin_dialog::{DialogExt, MessageDialogKind};

use crate::{
    append_desktop_log, append_startup_log,
    boot_sequence::BootOutcome,
    native_window::{BackdropPreference, TauriWindowServices},
    BackendState, MainWindowChrome, APP_DISPLAY_NAME, MAIN_WINDOW_LABEL,
};

pub(crate) fn get_main_window(app_handle: &AppHandle) -> Result<WebviewWindow, String> {
    app_handle
        .get_webview_window(MAIN_WINDOW_LABEL)
        .ok_or_else(|| "Main window is unavailable.".to_string())
}

/// Builds the `main` window from its config entry and registers its chrome.
pub(crate) fn create_main_window(app: &App) -> Result<WebviewWindow, String> {
    let window_config = app
        .config()
        .app
        .windows
        .iter()
        .find(|window| window.label == MAIN_WINDOW_LABEL)
        .cloned()
        .ok_or_else(|| format!("No '{MAIN_WINDOW_LABEL}' window in the app config."))?;

    let window = WebviewWindowBuilder::from_config(app.handle(), &window_config)
        .map_err(|error| format!("Failed to prepare main window: {error}"))?
        .build()
        .map_err(|error| format!("Failed to initialize the embedded renderer: {error}"))?;

    if !app.manage(MainWindowChrome::new(TauriWindowServices::new(window.clone()))) {
        append_startup_log("main window chrome already registered");
    }
    Ok(window)
}

pub(crate) fn focus_main_window(app_handle: &AppHandle) {
    let Ok(window) = get_main_window(app_handle) else {
        return;
    };
    if let Err(error) = window.unminimize() {
        append_desktop_log(&format!("failed to unminimize main window: {error}"));
    }
    if let Err(error) = window.show() {
        append_desktop_log(&format!("failed to show main window: {error}"));
    }
    if let Err(error) = window.set_focus() {
        append_desktop_log(&format!("failed to focus main window: {error}"));
    }
}

fn navigate_to(window: &WebviewWindow, url: &str) -> Result<(), String> {
    let js = format!(
        "window.location.replace({});",
        serde_json::to_string(url).map_err(|error| format!("Failed to encode URL: {error}"))?
    );
    window
        .eval(&js)
        .map_err(|error| format!("Failed to navigate renderer to {url}: {error}"))
}

/// Final boot step, on the UI thread: apply chrome theming, then point the
/// renderer at the backend origin whatever the boot outcome was.
pub(crate) fn embed_renderer(app_handle: &AppHandle, backend_url: &str, outcome: BootOutcome) {
    if app_handle.state::<BackendState>().is_shutting_down() {
        append_startup_log("embed skipped: shutdown in progress");
        return;
    }

    if let Some(chrome) = app_handle.try_state::<MainWindowChrome>() {
        chrome.with_chrome(|chrome| {
            chrome.apply_backdrop_once(BackdropPreference::default(), append_startup_log);
            if let Err(error) = chrome.sync_from_os() {
                append_startup_log(&format!("failed to read window state: {error}"));
            }
        });
    }

    let result =
        get_main_window(app_handle).and_then(|window| navigate_to(&window, backend_url));
    match result {
        Ok(()) => append_startup_log(&format!(
            "renderer pointed at {backend_url} ({outcome:?})"
        )),
        Err(error) => {
            append_startup_log(&format!("renderer embedding failed: {error}"));
            show_renderer_error(app_handle, &error, false);
        }
    }
}

/// Modal error for renderer failures. The window stays open unless
/// `exit_after` is set, which is only used when no window could be created.
pub(crate) fn show_renderer_error(app_handle: &AppHandle, message: &str, exit_after: bool) {
    let mut dialog = app_handle
        .dialog()
        .message(format!("WebView init failed: {message}"))
        .title(APP_DISPLAY_NAME)
        .kind(MessageDialogKind::Error);
    if let Ok(window) = get_main_window(app_handle) {
        dialog = dialog.parent(&window);
    }

    let exit_handle = app_handle.clone();
    dialog.show(move |_| {
        if exit_after {
            exit_handle.exit(1);
        }
    });
}
