pub mod error;
pub mod language;
pub mod models;
pub mod piston;

pub use error::{ExecutorError, Result};
pub use language::runtime_for;
pub use models::{CodeExecutor, ExecutionRequest, RunOutput};
pub use piston::PistonClient;
