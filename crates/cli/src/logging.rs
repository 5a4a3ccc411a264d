use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use env_logger::{Env, Target};
use presence_guard_core::shared::constants::APP_NAME;

const LOG_FILE_NAME: &str = "presence-guard.log";

/// Sets up `env_logger` with an `info` default (overridable via `RUST_LOG`).
///
/// Records go to stderr and are appended to `log_file`, or to the default
/// log under the local data directory. If the file cannot be opened,
/// logging continues on stderr only.
pub fn init(log_file: Option<&Path>) {
    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or("info"));
    builder.format_timestamp_secs();

    let path = log_file.map(Path::to_path_buf).or_else(default_log_path);
    let mut file_error = None;
    if let Some(path) = &path {
        match open_append(path) {
            Ok(file) => {
                builder.target(Target::Pipe(Box::new(Tee::new(io::stderr(), file))));
            }
            Err(e) => file_error = Some(format!("{}: {e}", path.display())),
        }
    }

    builder.init();

    match (file_error, path) {
        (Some(e), _) => log::warn!("Logging to stderr only, cannot open log file {e}"),
        (None, Some(path)) => log::debug!("Logging to {}", path.display()),
        (None, None) => log::warn!("No local data directory, logging to stderr only"),
    }
}

pub fn default_log_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|dir| dir.join(APP_NAME).join(LOG_FILE_NAME))
}

fn open_append(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Writes every record to the console and to the log file.
///
/// Console errors are ignored; a failing file write is reported.
struct Tee<C: Write, F: Write> {
    console: C,
    file: F,
}

impl<C: Write, F: Write> Tee<C, F> {
    fn new(console: C, file: F) -> Self {
        Self { console, file }
    }
}

impl<C: Write, F: Write> Write for Tee<C, F> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let _ = self.console.write_all(buf);
        self.file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        let _ = self.console.flush();
        self.file.flush()
    }
}
