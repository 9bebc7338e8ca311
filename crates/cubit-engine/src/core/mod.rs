//! Contract between the window runtime and the application.
//!
//! The runtime owns the platform loop; applications implement [`App`] and get
//! a [`FrameCtx`] once per frame.

mod app;
mod ctx;

pub use app::{App, AppControl};
pub use ctx::{FrameCtx, WindowCtx};
