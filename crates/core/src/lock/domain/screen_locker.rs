use thiserror::Error;

#[derive(Error, Debug)]
pub enum LockError {
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{program} exited with {status}")]
    CommandFailed { program: String, status: String },
}

/// Locks the OS session.
///
/// One call is one attempt: implementations do not retry. Locking an
/// already locked screen is harmless.
pub trait ScreenLocker: Send {
    fn lock_screen(&mut self) -> Result<(), LockError>;
}
