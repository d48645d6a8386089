// Non-Windows magnifier stub.
//
// The Magnification API has no counterpart here, so every query fails with
// `Unavailable` and the nudge feature degrades to a no-op. Presence and
// tracking display are unaffected.

use super::{MagnifierError, MagnifierTransform, ScreenMagnifierControl};
use crate::gesture::PanDirection;

pub struct UnsupportedMagnifier;

impl UnsupportedMagnifier {
    pub fn new() -> Self {
        Self
    }
}

impl Default for UnsupportedMagnifier {
    fn default() -> Self {
        Self::new()
    }
}

impl ScreenMagnifierControl for UnsupportedMagnifier {
    fn initialize(&mut self) -> Result<(), MagnifierError> {
        tracing::warn!("screen magnifier control not available on this platform; blink-to-pan disabled");
        Err(MagnifierError::Unavailable)
    }

    fn uninitialize(&mut self) -> Result<(), MagnifierError> {
        Ok(())
    }

    fn fullscreen_transform(&self) -> Result<MagnifierTransform, MagnifierError> {
        Err(MagnifierError::Unavailable)
    }

    fn pan(
        &mut self,
        _direction: PanDirection,
        _transform: &MagnifierTransform,
    ) -> Result<(), MagnifierError> {
        Err(MagnifierError::Unavailable)
    }
}
