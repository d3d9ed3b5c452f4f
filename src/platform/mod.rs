// Host-side helpers: shell execution and process listing

use serde::Serialize;
use std::process::Stdio;
use sysinfo::System;
use tokio::process::Command;
use tracing::debug;

/// Outcome of one local shell command.
#[derive(Debug, Clone, Serialize)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub return_code: i32,
}

/// One row of the process table.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessInfo {
    pub pid: u32,
    pub name: String,
    pub username: String,
}

/// Human-readable OS name for banners and prompts.
pub fn operating_system() -> &'static str {
    match std::env::consts::OS {
        "linux" => "Linux",
        "macos" => "macOS",
        "windows" => "Windows",
        other => other,
    }
}

/// Run a shell command to completion, capturing everything.
///
/// Never errors: a command that cannot start is reported through the exit
/// code (-1) and stderr, which is all the callers show the user anyway.
pub async fn execute_command(command: &str) -> CommandOutput {
    debug!("Executing: {}", command);

    let (shell, flag) = if cfg!(windows) {
        ("cmd", "/C")
    } else {
        ("sh", "-c")
    };

    let result = Command::new(shell)
        .arg(flag)
        .arg(command)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await;

    match result {
        Ok(output) => CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            return_code: output.status.code().unwrap_or(-1),
        },
        Err(err) => CommandOutput {
            stdout: String::new(),
            stderr: format!("Failed to run command: {}", err),
            return_code: -1,
        },
    }
}

/// Snapshot of everything currently running, with usernames resolved.
///
/// Synchronous and not cheap; web handlers call it through `spawn_blocking`.
pub fn list_processes() -> Vec<ProcessInfo> {
    let mut system = System::new_all();
    system.refresh_all();
    let users = sysinfo::Users::new_with_refreshed_list();

    let mut processes: Vec<ProcessInfo> = system
        .processes()
        .iter()
        .map(|(pid, process)| {
            let username = process
                .user_id()
                .and_then(|uid| users.get_user_by_id(uid))
                .map(|user| user.name().to_string())
                .unwrap_or_else(|| "unknown".to_string());

            ProcessInfo {
                pid: pid.as_u32(),
                name: process.name().to_string_lossy().into_owned(),
                username,
            }
        })
        .collect();

    processes.sort_by_key(|p| p.pid);
    processes
}
