pub mod audio;
pub mod config;
pub mod error;
pub mod kernel;
pub mod plan;
pub mod session;
pub mod summary;

pub use config::SessionConfig;
pub use kernel::controller::SessionController;
pub use kernel::exercise::ExerciseSpec;
pub use session::{SessionHandle, SessionRuntime};
