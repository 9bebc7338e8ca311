//! GPU device management.
//!
//! - `Gpu`: window-bound Instance/Adapter/Device/Queue, surface and depth
//! - `HeadlessGpu`: the same without a window, rendering offscreen

mod gpu;
mod headless;
mod init;

pub use gpu::{Gpu, GpuFrame, SurfaceErrorAction};
pub use headless::HeadlessGpu;
pub use init::GpuInit;
