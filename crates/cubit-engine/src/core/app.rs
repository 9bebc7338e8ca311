use winit::event::{DeviceEvent, WindowEvent};

use super::ctx::FrameCtx;

/// Returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application driven by [`crate::window::Runtime`].
pub trait App {
    fn on_window_event(&mut self, event: &WindowEvent) -> AppControl {
        let _ = event;
        AppControl::Continue
    }

    /// Raw device input (unaccelerated mouse motion and the like).
    fn on_device_event(&mut self, event: &DeviceEvent) -> AppControl {
        let _ = event;
        AppControl::Continue
    }

    /// Called once per redraw.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl;
}
