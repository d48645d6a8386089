pub mod detector;
pub mod policy;

pub use detector::{BlinkDetector, Transition};
pub use policy::{NudgePolicy, PanDirection};
