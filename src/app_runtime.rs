use tauri::{webview::PageLoadEvent, Manager, RunEvent};

use crate::{
    append_desktop_log, append_startup_log, chrome_bridge, exit_events, logging, main_window,
    runtime_paths, shell_config::ShellConfig, startup_task, window_events, BackendState,
    MainWindowChrome, DESKTOP_LOG_FILE,
};

pub(crate) fn run() {
    append_startup_log("desktop process starting");
    append_startup_log(&format!(
        "desktop log path: {}",
        logging::resolve_desktop_log_path(runtime_paths::default_app_root_dir(), DESKTOP_LOG_FILE)
            .display()
    ));

    let config = ShellConfig::from_env();
    append_startup_log(&format!(
        "backend origin={} health={} timeout_ms={} poll_ms={}",
        config.backend_url,
        config.health_url,
        config.backend_timeout.as_millis(),
        config.poll_interval.as_millis()
    ));

    tauri::Builder::default()
        .plugin(tauri_plugin_single_instance::init(|app, _argv, _cwd| {
            append_desktop_log("second instance launched; focusing existing window");
            main_window::focus_main_window(app);
        }))
        .plugin(tauri_plugin_dialog::init())
        .manage(BackendState::new(config))
        .invoke_handler(tauri::generate_handler![
            crate::chrome_commands::chrome_drag_region_pressed,
            crate::chrome_commands::chrome_resize_grip_pressed,
            crate::chrome_commands::chrome_minimize,
            crate::chrome_commands::chrome_toggle_maximize,
            crate::chrome_commands::chrome_close,
            crate::chrome_commands::chrome_reload,
            crate::chrome_commands::chrome_open_devtools,
            crate::chrome_commands::chrome_sync_window_state,
            crate::chrome_commands::desktop_get_backend_diagnostics,
        ])
        .on_window_event(window_events::handle_window_event)
        .on_page_load(|webview, payload| {
            if payload.event() != PageLoadEvent::Finished {
                return;
            }
            append_desktop_log(&format!("page-load finished: {}", payload.url()));
            let state = webview.app_handle().state::<BackendState>();
            if chrome_bridge::should_inject_chrome_bridge(&state.config.backend_url, payload.url())
            {
                chrome_bridge::inject_chrome_bridge(webview, append_desktop_log);
                if let Some(chrome) = webview.app_handle().try_state::<MainWindowChrome>() {
                    if let Some(Err(error)) = chrome.try_with_chrome(|chrome| chrome.push_glyph()) {
                        append_desktop_log(&format!("failed to push maximize glyph: {error}"));
                    }
                }
            }
        })
        .setup(|app| {
            if let Err(error) = main_window::create_main_window(app) {
                append_startup_log(&error);
                main_window::show_renderer_error(app.handle(), &error, true);
                return Ok(());
            }

            startup_task::spawn_startup_task(app.handle().clone());
            Ok(())
        })
        .build(tauri::generate_context!())
        .expect("error while building tauri application")
        .run(|app_handle, event| match event {
            RunEvent::ExitRequested { .. } => exit_events::handle_exit_requested(app_handle),
            RunEvent::Exit => exit_events::handle_exit_event(app_handle),
            _ => {}
        });
}
