use std::{
    env,
    path::{Path, PathBuf},
};

use crate::{runtime_paths, BACKEND_AUTO_START_ENV, BACKEND_CMD_ENV, BACKEND_CWD_ENV};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LaunchPlan {
    pub(crate) program: PathBuf,
    pub(crate) args: Vec<String>,
    pub(crate) cwd: PathBuf,
    pub(crate) packaged_mode: bool,
}

impl LaunchPlan {
    pub(crate) fn packaged(install_dir: &Path) -> Self {
        Self {
            program: runtime_paths::packaged_backend_executable(install_dir),
            args: Vec::new(),
            cwd: install_dir.to_path_buf(),
            packaged_mode: true,
        }
    }

    /// Only plans naming a concrete path are checked for existence before spawn;
    /// bare command names are left to the OS search path.
    pub(crate) fn has_explicit_path(&self) -> bool {
        self.program.components().count() > 1 || self.program.is_absolute()
    }

    pub(crate) fn debug_command(&self) -> Vec<String> {
        let mut parts = vec![self.program.to_string_lossy().to_string()];
        parts.extend(self.args.iter().cloned());
        parts
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum LaunchPlanResolution {
    Launch(LaunchPlan),
    AutoStartDisabled,
}

pub(crate) fn resolve_launch_plan() -> Result<LaunchPlanResolution, String> {
    resolve_launch_plan_with(|key| env::var(key).ok(), runtime_paths::install_dir())
}

pub(crate) fn resolve_launch_plan_with<F>(
    lookup: F,
    install_dir: Option<PathBuf>,
) -> Result<LaunchPlanResolution, String>
where
    F: Fn(&str) -> Option<String>,
{
    if lookup(BACKEND_AUTO_START_ENV).is_some_and(|value| value.trim() == "0") {
        return Ok(LaunchPlanResolution::AutoStartDisabled);
    }

    let cwd_override = lookup(BACKEND_CWD_ENV)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .map(PathBuf::from);

    if let Some(custom_cmd) = lookup(BACKEND_CMD_ENV)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
    {
        let mut pieces = shlex::split(&custom_cmd)
            .ok_or_else(|| format!("Invalid {BACKEND_CMD_ENV}: {custom_cmd}"))?;
        if pieces.is_empty() {
            return Err(format!("{BACKEND_CMD_ENV} is empty."));
        }
        let program = PathBuf::from(pieces.remove(0));
        let cwd = cwd_override
            .or_else(|| install_dir.clone())
            .or_else(|| env::current_dir().ok())
            .ok_or_else(|| "Cannot resolve a working directory for the backend.".to_string())?;

        return Ok(LaunchPlanResolution::Launch(LaunchPlan {
            program,
            args: pieces,
            cwd,
            packaged_mode: false,
        }));
    }

    let install_dir = install_dir
        .ok_or_else(|| "Cannot resolve the installation directory.".to_string())?;
    let mut plan = LaunchPlan::packaged(&install_dir);
    if let Some(cwd) = cwd_override {
        plan.cwd = cwd;
    }
    Ok(LaunchPlanResolution::Launch(plan))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::BACKEND_EXECUTABLE_NAME;

    fn resolve(pairs: &[(&str, &str)]) -> Result<LaunchPlanResolution, String> {
        let values: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        resolve_launch_plan_with(
            |key| values.get(key).cloned(),
            Some(PathBuf::from("/opt/stressless")),
        )
    }

    #[test]
    fn packaged_plan_uses_bundled_executable_and_install_dir() {
        let Ok(LaunchPlanResolution::Launch(plan)) = resolve(&[]) else {
            panic!("expected a launch plan");
        };
        assert!(plan.packaged_mode);
        assert_eq!(
            plan.program,
            PathBuf::from("/opt/stressless")
                .join("bin")
                .join(BACKEND_EXECUTABLE_NAME)
        );
        assert_eq!(plan.cwd, PathBuf::from("/opt/stressless"));
        assert!(plan.has_explicit_path());
    }

    #[test]
    fn custom_command_is_shell_split() {
        let Ok(LaunchPlanResolution::Launch(plan)) = resolve(&[
            (BACKEND_CMD_ENV, "go run './cmd/server' -v"),
            (BACKEND_CWD_ENV, "/src/server-go"),
        ]) else {
            panic!("expected a launch plan");
        };
        assert!(!plan.packaged_mode);
        assert_eq!(plan.program, PathBuf::from("go"));
        assert_eq!(plan.args, vec!["run", "./cmd/server", "-v"]);
        assert_eq!(plan.cwd, PathBuf::from("/src/server-go"));
        assert!(!plan.has_explicit_path());
        assert_eq!(plan.debug_command(), vec!["go", "run", "./cmd/server", "-v"]);
    }

    #[test]
    fn unbalanced_quotes_are_rejected() {
        let error = resolve(&[(BACKEND_CMD_ENV, "go run 'oops")]).unwrap_err();
        assert!(error.contains(BACKEND_CMD_ENV));
    }

    #[test]
    fn auto_start_can_be_disabled() {
        assert_eq!(
            resolve(&[(BACKEND_AUTO_START_ENV, "0")]),
            Ok(LaunchPlanResolution::AutoStartDisabled)
        );
    }
}
