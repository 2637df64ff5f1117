use std::time::Duration;

/// Tick clock handed in by the runtime each update.
#[derive(Clone, Copy, Debug)]
pub struct Time {
    /// Time elapsed since the previous update
    pub elapsed: Duration,
    /// Time elapsed since the simulation started
    pub total: Duration,
}

impl Time {
    pub fn from_seconds(elapsed: f32, total: f32) -> Time {
        Time {
            elapsed: Duration::from_secs_f32(elapsed),
            total: Duration::from_secs_f32(total),
        }
    }
}
