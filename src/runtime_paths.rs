use std::{env, path::PathBuf};

use crate::{APP_STATE_DIR, BACKEND_BIN_DIR, BACKEND_EXECUTABLE_NAME};

/// Directory holding the running shell executable.
pub(crate) fn install_dir() -> Option<PathBuf> {
    env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|parent| parent.to_path_buf()))
}

pub(crate) fn default_app_root_dir() -> Option<PathBuf> {
    home::home_dir()
        .map(|home| home.join(APP_STATE_DIR))
        .or_else(install_dir)
}

pub(crate) fn packaged_backend_executable(install_dir: &std::path::Path) -> PathBuf {
    install_dir.join(BACKEND_BIN_DIR).join(BACKEND_EXECUTABLE_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packaged_backend_executable_lives_in_bin_dir() {
        let path = packaged_backend_executable(std::path::Path::new("/opt/stressless"));
        assert_eq!(
            path,
            PathBuf::from("/opt/stressless")
                .join("bin")
                .join(BACKEND_EXECUTABLE_NAME)
        );
    }
}
