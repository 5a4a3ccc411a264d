use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const LAUNCH_AGENT_LABEL: &str = "com.presenceguard.monitor";

/// Installs a per-user launch agent that runs at login.
pub fn register(exe: &Path) -> Result<String, Box<dyn std::error::Error>> {
    let dir = dirs::home_dir()
        .ok_or("could not determine the home directory")?
        .join("Library")
        .join("LaunchAgents");
    let path = write_agent(&dir, exe)?;
    Ok(path.display().to_string())
}

fn write_agent(dir: &Path, exe: &Path) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(format!("{LAUNCH_AGENT_LABEL}.plist"));
    fs::write(&path, launch_agent_plist(exe))?;
    Ok(path)
}

fn launch_agent_plist(exe: &Path) -> String {
    let program = xml_escape(&exe.display().to_string());
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
    <key>Label</key>
    <string>{LAUNCH_AGENT_LABEL}</string>
    <key>ProgramArguments</key>
    <array>
        <string>{program}</string>
    </array>
    <key>RunAtLoad</key>
    <true/>
</dict>
</plist>
"#
    )
}

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plist_runs_at_load() {
        let plist = launch_agent_plist(Path::new("/Applications/Presence Guard/presence-guard"));
        assert!(plist.contains("<key>RunAtLoad</key>\n    <true/>"));
        assert!(plist.contains("<string>/Applications/Presence Guard/presence-guard</string>"));
        assert!(plist.contains(&format!("<string>{LAUNCH_AGENT_LABEL}</string>")));
    }

    #[test]
    fn test_plist_escapes_path() {
        let plist = launch_agent_plist(Path::new("/tmp/a&b<c>/presence-guard"));
        assert!(plist.contains("/tmp/a&amp;b&lt;c&gt;/presence-guard"));
    }

    #[test]
    fn test_write_agent_uses_label_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_agent(dir.path(), Path::new("/usr/local/bin/presence-guard")).unwrap();
        assert_eq!(path, dir.path().join("com.presenceguard.monitor.plist"));
        assert!(fs::read_to_string(path).unwrap().contains("/usr/local/bin/presence-guard"));
    }
}
