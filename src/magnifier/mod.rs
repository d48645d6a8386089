// Screen magnifier control surface.
//
// The model depends only on this trait; the Windows backend talks to the
// Magnification API, every other platform gets a stub that degrades the
// feature silently.

use serde::Serialize;
use thiserror::Error;

use crate::gesture::PanDirection;
use crate::screen::ScreenDimensions;

#[cfg(windows)]
pub mod windows;

#[cfg(not(windows))]
pub mod unsupported;

/// Fullscreen magnifier state: zoom factor plus the top-left source
/// coordinate of the magnified viewport.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct MagnifierTransform {
    pub zoom_level: f32,
    pub viewport_x: i32,
    pub viewport_y: i32,
}

#[derive(Debug, Error)]
pub enum MagnifierError {
    #[error("magnifier control is not available on this platform")]
    Unavailable,
    #[error("{0} failed")]
    Native(&'static str),
}

pub trait ScreenMagnifierControl: Send {
    fn initialize(&mut self) -> Result<(), MagnifierError>;

    /// Safe to call without a prior successful `initialize`, and more than
    /// once; the native library is released at most one time.
    fn uninitialize(&mut self) -> Result<(), MagnifierError>;

    /// Current transform, queried fresh on every call.
    fn fullscreen_transform(&self) -> Result<MagnifierTransform, MagnifierError>;

    /// Shift the magnified viewport one step in the given direction, keeping
    /// the zoom level unchanged.
    fn pan(
        &mut self,
        direction: PanDirection,
        transform: &MagnifierTransform,
    ) -> Result<(), MagnifierError>;
}

/// Backend for the build target.
pub fn platform_default(screen: ScreenDimensions) -> Box<dyn ScreenMagnifierControl> {
    #[cfg(windows)]
    {
        Box::new(windows::WindowsMagnifier::new(screen))
    }

    #[cfg(not(windows))]
    {
        let _ = screen;
        Box::new(unsupported::UnsupportedMagnifier::new())
    }
}
