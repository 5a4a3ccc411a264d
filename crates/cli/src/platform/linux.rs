use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use presence_guard_core::shared::constants::APP_NAME;

const DESKTOP_FILE_NAME: &str = "presence-guard.desktop";

/// Writes an XDG autostart entry to `~/.config/autostart`.
pub fn register(exe: &Path) -> Result<String, Box<dyn std::error::Error>> {
    let dir = dirs::config_dir()
        .ok_or("could not determine the config directory")?
        .join("autostart");
    let path = write_entry(&dir, exe)?;
    Ok(path.display().to_string())
}

fn write_entry(dir: &Path, exe: &Path) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(DESKTOP_FILE_NAME);
    fs::write(&path, desktop_entry(exe))?;
    Ok(path)
}

fn desktop_entry(exe: &Path) -> String {
    let exec = exe
        .display()
        .to_string()
        .replace('\\', "\\\\")
        .replace('"', "\\\"");
    format!(
        "[Desktop Entry]\n\
         Type=Application\n\
         Name={APP_NAME}\n\
         Comment=Locks the screen when nobody is in front of the camera\n\
         Exec=\"{exec}\"\n\
         Terminal=false\n\
         X-GNOME-Autostart-enabled=true\n"
    )
}
