//! Bus listeners.
//!
//! - [`LogWriter`] prints every pipeline event to stdout _(demo/reference only)_.

mod log;

pub use log::LogWriter;
