use serde::Serialize;

/// Primary display size in physical pixels. Captured once at startup and
/// treated as immutable for the process lifetime.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ScreenDimensions {
    pub width: i32,
    pub height: i32,
}

const FALLBACK_WIDTH: i32 = 1920;
const FALLBACK_HEIGHT: i32 = 1080;

impl ScreenDimensions {
    pub fn detect() -> Self {
        #[cfg(windows)]
        {
            use windows::Win32::UI::WindowsAndMessaging::{
                GetSystemMetrics, SM_CXSCREEN, SM_CYSCREEN,
            };

            let width = unsafe { GetSystemMetrics(SM_CXSCREEN) };
            let height = unsafe { GetSystemMetrics(SM_CYSCREEN) };
            // GetSystemMetrics reports 0 on failure.
            if width > 0 && height > 0 {
                return Self { width, height };
            }
            tracing::warn!("GetSystemMetrics returned no screen size; using fallback");
        }

        #[cfg(not(windows))]
        tracing::warn!("no display query on this platform; using fallback screen size");

        Self {
            width: FALLBACK_WIDTH,
            height: FALLBACK_HEIGHT,
        }
    }
}
