//! Terminal output helpers
//!
//! Progress bars are only drawn on an interactive stderr; CI logs get
//! plain tracing output instead.

mod context;
mod progress;

pub use context::UiContext;
pub use progress::TransferProgress;
