pub(crate) const MAIN_WINDOW_LABEL: &str = "main";
pub(crate) const APP_DISPLAY_NAME: &str = "Stressless";

pub(crate) const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8080/";
pub(crate) const BACKEND_URL_ENV: &str = "STRESSLESS_BACKEND_URL";
pub(crate) const DEFAULT_HEALTH_PATH: &str = "/api/presets";
pub(crate) const HEALTH_PATH_ENV: &str = "STRESSLESS_HEALTH_PATH";

pub(crate) const BACKEND_CMD_ENV: &str = "STRESSLESS_BACKEND_CMD";
pub(crate) const BACKEND_CWD_ENV: &str = "STRESSLESS_BACKEND_CWD";
pub(crate) const BACKEND_AUTO_START_ENV: &str = "STRESSLESS_BACKEND_AUTO_START";
pub(crate) const BACKEND_BIN_DIR: &str = "bin";
#[cfg(target_os = "windows")]
pub(crate) const BACKEND_EXECUTABLE_NAME: &str = "stressless-server.exe";
#[cfg(not(target_os = "windows"))]
pub(crate) const BACKEND_EXECUTABLE_NAME: &str = "stressless-server";

pub(crate) const DEFAULT_BACKEND_TIMEOUT_MS: u64 = 20_000;
pub(crate) const BACKEND_TIMEOUT_MIN_MS: u64 = 1_000;
pub(crate) const BACKEND_TIMEOUT_MAX_MS: u64 = 5 * 60 * 1000;
pub(crate) const BACKEND_TIMEOUT_ENV: &str = "STRESSLESS_BACKEND_TIMEOUT_MS";
pub(crate) const DEFAULT_READY_POLL_INTERVAL_MS: u64 = 400;
pub(crate) const READY_POLL_INTERVAL_MIN_MS: u64 = 50;
pub(crate) const READY_POLL_INTERVAL_MAX_MS: u64 = 10_000;
pub(crate) const READY_POLL_INTERVAL_ENV: &str = "STRESSLESS_READY_POLL_INTERVAL_MS";
pub(crate) const DEFAULT_READY_PROBE_TIMEOUT_MS: u64 = 1_500;
pub(crate) const READY_PROBE_TIMEOUT_MIN_MS: u64 = 100;
pub(crate) const READY_PROBE_TIMEOUT_MAX_MS: u64 = 30_000;
pub(crate) const READY_PROBE_TIMEOUT_ENV: &str = "STRESSLESS_READY_PROBE_TIMEOUT_MS";

pub(crate) const BACKEND_OUTPUT_RING_LINES: usize = 500;

pub(crate) const DESKTOP_LOG_FILE: &str = "desktop.log";
pub(crate) const DESKTOP_LOG_MAX_BYTES: u64 = 5 * 1024 * 1024;
pub(crate) const LOG_BACKUP_COUNT: usize = 5;
pub(crate) const APP_STATE_DIR: &str = ".stressless";

#[cfg(target_os = "windows")]
pub(crate) const CREATE_NO_WINDOW: u32 = 0x0800_0000;
