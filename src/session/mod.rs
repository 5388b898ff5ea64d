pub mod cadence;
pub mod handle;
pub mod runtime;

pub use handle::SessionHandle;
pub use runtime::SessionRuntime;
