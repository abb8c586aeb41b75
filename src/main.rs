#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app_constants;
mod app_helpers;
mod app_runtime;
mod app_types;
mod backend_http;
mod backend_output;
mod backend_process;
mod backend_readiness;
mod boot_sequence;
mod chrome_bridge;
mod chrome_commands;
mod exit_events;
mod http_response;
mod launch_plan;
mod logging;
mod main_window;
mod native_window;
mod process_control;
mod runtime_paths;
mod shell_config;
mod startup_task;
mod ui_dispatch;
mod window_chrome;
mod window_events;

pub(crate) use app_constants::*;
pub(crate) use app_helpers::{
    append_backend_log, append_desktop_log, append_shutdown_log, append_startup_log,
};
pub(crate) use app_types::{BackendDiagnostics, BackendState, ChromeCommandResult, MainWindowChrome};

fn main() {
    app_runtime::run();
}
