use std::process::{Child, Command};
#[cfg(target_os = "windows")]
use std::process::Stdio;

#[cfg(not(target_os = "windows"))]
use sysinfo::{Pid, ProcessesToUpdate, System};

pub(crate) fn configure_background_command(command: &mut Command) {
    #[cfg(target_os = "windows")]
    {
        use std::os::windows::process::CommandExt;
        command.creation_flags(crate::CREATE_NO_WINDOW);
    }

    #[cfg(not(target_os = "windows"))]
    {
        let _ = command;
    }
}

/// Pids of every live descendant of `root`, parents before children.
#[cfg(not(target_os = "windows"))]
pub(crate) fn collect_descendant_pids(system: &System, root: Pid) -> Vec<Pid> {
    let mut found: Vec<Pid> = Vec::new();
    let mut frontier = vec![root];
    while let Some(parent) = frontier.pop() {
        for (pid, process) in system.processes() {
            if process.parent() == Some(parent) && *pid != root && !found.contains(pid) {
                found.push(*pid);
                frontier.push(*pid);
            }
        }
    }
    found
}

/// Kills `child` and everything it spawned, then reaps `child`.
///
/// A child that exits on its own between the caller's liveness check and the
/// kill is not an error.
#[cfg(target_os = "windows")]
pub(crate) fn kill_process_tree(child: &mut Child) -> Result<(), String> {
    let pid = child.id();
    let mut command = Command::new("taskkill");
    command
        .args(["/pid", &pid.to_string(), "/t", "/f"])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .stdin(Stdio::null());
    configure_background_command(&mut command);

    let taskkill_result = command.status();
    let taskkill_ok = matches!(&taskkill_result, Ok(status) if status.success());
    if !taskkill_ok {
        let _ = child.kill();
    }
    child
        .wait()
        .map(|_| ())
        .map_err(|error| format!("Failed to reap backend process {pid}: {error}"))?;

    match taskkill_result {
        Ok(_) => Ok(()),
        Err(error) => Err(format!("Failed to run taskkill for pid {pid}: {error}")),
    }
}

#[cfg(not(target_os = "windows"))]
pub(crate) fn kill_process_tree(child: &mut Child) -> Result<(), String> {
    let pid = child.id();
    let mut system = System::new();
    system.refresh_processes(ProcessesToUpdate::All, true);
    let descendants = collect_descendant_pids(&system, Pid::from_u32(pid));

    let root_kill = child.kill();
    let mut failed = Vec::new();
    for descendant in &descendants {
        if let Some(process) = system.process(*descendant) {
            if !process.kill() {
                failed.push(descendant.as_u32());
            }
        }
    }
    child
        .wait()
        .map(|_| ())
        .map_err(|error| format!("Failed to reap backend process {pid}: {error}"))?;

    if let Err(error) = root_kill {
        if error.kind() != std::io::ErrorKind::InvalidInput {
            return Err(format!("Failed to kill backend process {pid}: {error}"));
        }
    }
    if !failed.is_empty() {
        return Err(format!(
            "Failed to kill backend descendants of {pid}: {failed:?}"
        ));
    }
    Ok(())
}
