use tracing_subscriber::EnvFilter;

use presence_pan::host::sim::{SimStep, SimulatedHost};
use presence_pan::host::EngineVersion;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Scripted stand-in for the tracking engine: the user sits down, looks at the
    // left half of the screen, holds a deliberate 700 ms blink, then a short
    // reflex blink, and finally leaves.
    let script = vec![
        SimStep::Present(true),
        SimStep::Wait(100),
        SimStep::Tracked(true),
        SimStep::Sample(420.0, 510.0),
        SimStep::Sample(400.0, 520.0),
        SimStep::Wait(200),
        SimStep::Tracked(false),
        SimStep::Wait(700),
        SimStep::Tracked(true),
        SimStep::Wait(300),
        SimStep::Tracked(false),
        SimStep::Wait(150),
        SimStep::Tracked(true),
        SimStep::Wait(200),
        SimStep::Tracked(false),
        SimStep::Present(false),
    ];

    let host = SimulatedHost::new(EngineVersion { major: 1, minor: 4 }, script);
    presence_pan::run(&host);
}
