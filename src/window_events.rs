use tauri::{Manager, Window, WindowEvent};

use crate::{append_desktop_log, exit_events, MainWindowChrome, MAIN_WINDOW_LABEL};

pub(crate) fn handle_window_event(window: &Window, event: &WindowEvent) {
    if window.label() != MAIN_WINDOW_LABEL {
        return;
    }

    match event {
        WindowEvent::CloseRequested { .. } => {
            exit_events::shutdown_backend(window.app_handle(), "main window close requested");
        }
        // Maximize, restore and minimize from any source (snap layouts, keyboard
        // shortcuts, the taskbar) arrive as resizes.
        WindowEvent::Resized(_) => sync_chrome_with_os(window),
        _ => {}
    }
}

fn sync_chrome_with_os(window: &Window) {
    let Some(chrome) = window.app_handle().try_state::<MainWindowChrome>() else {
        return;
    };
    if let Some(Err(error)) = chrome.try_with_chrome(|chrome| chrome.sync_from_os()) {
        append_desktop_log(&format!("failed to sync window state: {error}"));
    }
}
