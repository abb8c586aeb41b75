use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
    sync::{Mutex, OnceLock},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DesktopLogCategory {
    Startup,
    Runtime,
    Backend,
    Shutdown,
}

impl DesktopLogCategory {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Startup => "startup",
            Self::Runtime => "runtime",
            Self::Backend => "backend",
            Self::Shutdown => "shutdown",
        }
    }
}

pub(crate) fn resolve_desktop_log_path(root_dir: Option<PathBuf>, file_name: &str) -> PathBuf {
    let base_dir = root_dir.unwrap_or_else(std::env::temp_dir);
    base_dir.join("logs").join(file_name)
}

fn rotated_path(log_path: &Path, index: usize) -> PathBuf {
    let mut raw = log_path.as_os_str().to_os_string();
    raw.push(format!(".{index}"));
    PathBuf::from(raw)
}

/// Shifts `desktop.log` -> `desktop.log.1` -> ... and drops the oldest backup.
fn rotate_log_if_needed(log_path: &Path, max_bytes: u64, backup_count: usize) {
    let Ok(metadata) = fs::metadata(log_path) else {
        return;
    };
    if max_bytes == 0 || metadata.len() < max_bytes {
        return;
    }

    if backup_count == 0 {
        let _ = fs::remove_file(log_path);
        return;
    }

    let _ = fs::remove_file(rotated_path(log_path, backup_count));
    for index in (1..backup_count).rev() {
        let source = rotated_path(log_path, index);
        if source.exists() {
            let _ = fs::rename(&source, rotated_path(log_path, index + 1));
        }
    }
    let _ = fs::rename(log_path, rotated_path(log_path, 1));
}

pub(crate) fn format_log_line(category: DesktopLogCategory, message: &str) -> String {
    format!(
        "[{}] [{}] {}\n",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
        category.as_str(),
        message
    )
}

pub(crate) fn append_desktop_log(
    category: DesktopLogCategory,
    message: &str,
    root_dir: Option<PathBuf>,
    file_name: &str,
    max_bytes: u64,
    backup_count: usize,
    write_lock: &OnceLock<Mutex<()>>,
) {
    let line = format_log_line(category, message);
    if cfg!(debug_assertions) {
        eprint!("{line}");
    }

    let log_path = resolve_desktop_log_path(root_dir, file_name);
    let lock = write_lock.get_or_init(|| Mutex::new(()));
    let _guard = match lock.lock() {
        Ok(guard) => guard,
        Err(error) => error.into_inner(),
    };

    if let Some(parent) = log_path.parent() {
        if fs::create_dir_all(parent).is_err() {
            return;
        }
    }
    rotate_log_if_needed(&log_path, max_bytes, backup_count);

    if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(&log_path) {
        let _ = file.write_all(line.as_bytes());
    }
}
