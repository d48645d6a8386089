// Viewport nudge direction policy.
//
// Best-effort cosmetic feature: given the gaze sample captured when the eyes
// closed, decide which way the magnified viewport should shift. The policy
// only picks a direction; pan distance belongs to the magnifier backend.

use serde::Serialize;

use crate::host::GazeSample;
use crate::magnifier::MagnifierTransform;
use crate::screen::ScreenDimensions;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PanDirection {
    Left,
    Right,
}

pub struct NudgePolicy {
    screen: ScreenDimensions,
}

impl NudgePolicy {
    pub fn new(screen: ScreenDimensions) -> Self {
        Self { screen }
    }

    /// `None` when the magnifier is not actually magnifying. Otherwise the
    /// screen half containing the captured gaze point picks the direction.
    pub fn decide(
        &self,
        sample: &GazeSample,
        transform: &MagnifierTransform,
    ) -> Option<PanDirection> {
        if transform.zoom_level <= 1.0 {
            return None;
        }

        if sample.x < f64::from(self.screen.width) / 2.0 {
            Some(PanDirection::Left)
        } else {
            Some(PanDirection::Right)
        }
    }
}
