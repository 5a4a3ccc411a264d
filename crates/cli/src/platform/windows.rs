use std::path::Path;
use std::process::Command;

const RUN_KEY: &str = r"HKCU\Software\Microsoft\Windows\CurrentVersion\Run";
const VALUE_NAME: &str = "PresenceGuard";

/// Adds a value under the current user's `Run` key.
pub fn register(exe: &Path) -> Result<String, Box<dyn std::error::Error>> {
    let output = Command::new("reg").args(reg_add_args(exe)).output()?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!("reg add failed ({}): {}", output.status, stderr.trim()).into());
    }
    Ok(format!(r"{RUN_KEY}\{VALUE_NAME}"))
}

fn reg_add_args(exe: &Path) -> Vec<String> {
    vec![
        "add".into(),
        RUN_KEY.into(),
        "/v".into(),
        VALUE_NAME.into(),
        "/t".into(),
        "REG_SZ".into(),
        "/d".into(),
        format!("\"{}\"", exe.display()),
        "/f".into(),
    ]
}
