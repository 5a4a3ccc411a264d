#[cfg(any(not(any(target_os = "macos", target_os = "windows")), test))]
mod linux;
#[cfg(any(target_os = "macos", test))]
mod macos;
#[cfg(any(target_os = "windows", test))]
mod windows;

use std::path::Path;

/// Registers `exe` to start when the current user logs in.
///
/// Returns a human-readable description of where it was registered.
pub fn register_autostart(exe: &Path) -> Result<String, Box<dyn std::error::Error>> {
    #[cfg(target_os = "macos")]
    {
        macos::register(exe)
    }
    #[cfg(target_os = "windows")]
    {
        windows::register(exe)
    }
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        linux::register(exe)
    }
}
