/// ----- TIMER MODULE -----
/// The coarse tick source. The scheduler calls `on_interval` once per
/// tick interval; the state machine only ever reads `current` and compares
/// it against the last value it acted on.

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickSource {
    current: u32,
    running: bool,
}

impl TickSource {
    pub fn new() -> Self {
        TickSource::default()
    }

    /// Resets the count to zero and starts counting.
    pub fn start(&mut self) {
        self.current = 0;
        self.running = true;
    }

    pub fn on_interval(&mut self) {
        if self.running {
            self.current = self.current.wrapping_add(1);
        }
    }

    pub fn current(&self) -> u32 {
        self.current
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}
