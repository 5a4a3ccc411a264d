use std::process::Command;

use crate::lock::domain::screen_locker::{LockError, ScreenLocker};

/// Locks the screen by running a single external command.
///
/// - Windows: `rundll32.exe user32.dll,LockWorkStation`
/// - macOS: `pmset displaysleepnow` (locks when "require password" is on)
/// - Linux: `loginctl lock-session`
pub struct CommandScreenLocker {
    program: String,
    args: Vec<String>,
}

impl CommandScreenLocker {
    pub fn new() -> Self {
        let (program, args) = platform_command();
        Self::with_command(program, args)
    }

    pub fn with_command(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Default for CommandScreenLocker {
    fn default() -> Self {
        Self::new()
    }
}

impl ScreenLocker for CommandScreenLocker {
    fn lock_screen(&mut self) -> Result<(), LockError> {
        log::debug!("Running {}", self.command_line());
        let output = Command::new(&self.program)
            .args(&self.args)
            .output()
            .map_err(|e| LockError::Spawn {
                program: self.program.clone(),
                source: e,
            })?;

        if output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let status = match stderr.trim() {
                "" => output.status.to_string(),
                msg => format!("{}: {msg}", output.status),
            };
            Err(LockError::CommandFailed {
                program: self.program.clone(),
                status,
            })
        }
    }
}

fn platform_command() -> (&'static str, &'static [&'static str]) {
    #[cfg(target_os = "windows")]
    {
        ("rundll32.exe", &["user32.dll,LockWorkStation"])
    }
    #[cfg(target_os = "macos")]
    {
        ("pmset", &["displaysleepnow"])
    }
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        ("loginctl", &["lock-session"])
    }
}
