use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("execution timed out after {0} ms")]
    Timeout(u64),

    #[error("executor unreachable: {0}")]
    Transport(String),

    #[error("executor returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed executor response: {0}")]
    Decode(String),
}

pub type Result<T> = std::result::Result<T, ExecutorError>;
