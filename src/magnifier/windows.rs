// Windows fullscreen magnifier backend (Magnification API).
//
// All four entry points are best-effort: a FALSE return from the native call
// surfaces as `MagnifierError::Native` and callers degrade. Requires the
// "Magnifier" accessibility feature; when it is not running, zoom reads back
// as 1.0 and the nudge policy never fires.

use windows::Win32::UI::Magnification::{
    MagGetFullscreenTransform, MagInitialize, MagSetFullscreenTransform, MagUninitialize,
};

use super::{MagnifierError, MagnifierTransform, ScreenMagnifierControl};
use crate::gesture::PanDirection;
use crate::screen::ScreenDimensions;

pub struct WindowsMagnifier {
    screen: ScreenDimensions,
    initialized: bool,
}

impl WindowsMagnifier {
    pub fn new(screen: ScreenDimensions) -> Self {
        Self {
            screen,
            initialized: false,
        }
    }
}

impl ScreenMagnifierControl for WindowsMagnifier {
    fn initialize(&mut self) -> Result<(), MagnifierError> {
        if self.initialized {
            return Ok(());
        }
        if !unsafe { MagInitialize() }.as_bool() {
            return Err(MagnifierError::Native("MagInitialize"));
        }
        self.initialized = true;
        Ok(())
    }

    fn uninitialize(&mut self) -> Result<(), MagnifierError> {
        if !self.initialized {
            return Ok(());
        }
        self.initialized = false;
        if !unsafe { MagUninitialize() }.as_bool() {
            return Err(MagnifierError::Native("MagUninitialize"));
        }
        Ok(())
    }

    fn fullscreen_transform(&self) -> Result<MagnifierTransform, MagnifierError> {
        let mut zoom_level: f32 = 0.0;
        let mut viewport_x: i32 = 0;
        let mut viewport_y: i32 = 0;

        let ok = unsafe {
            MagGetFullscreenTransform(&mut zoom_level, &mut viewport_x, &mut viewport_y)
        };
        if !ok.as_bool() {
            return Err(MagnifierError::Native("MagGetFullscreenTransform"));
        }

        Ok(MagnifierTransform {
            zoom_level,
            viewport_x,
            viewport_y,
        })
    }

    fn pan(
        &mut self,
        direction: PanDirection,
        transform: &MagnifierTransform,
    ) -> Result<(), MagnifierError> {
        // Step by half of the visible source width, clamped so the viewport
        // stays inside the screen.
        let visible_width =
            (f64::from(self.screen.width) / f64::from(transform.zoom_level)) as i32;
        let step = visible_width / 2;
        let max_x = (self.screen.width - visible_width).max(0);

        let target_x = match direction {
            PanDirection::Left => transform.viewport_x - step,
            PanDirection::Right => transform.viewport_x + step,
        }
        .clamp(0, max_x);

        let ok = unsafe {
            MagSetFullscreenTransform(transform.zoom_level, target_x, transform.viewport_y)
        };
        if !ok.as_bool() {
            return Err(MagnifierError::Native("MagSetFullscreenTransform"));
        }

        tracing::debug!(
            "magnifier pan {:?}: viewport x {} -> {}",
            direction,
            transform.viewport_x,
            target_x
        );
        Ok(())
    }
}
