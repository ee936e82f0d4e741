/// ----- DOORS MODULE -----
/// Door status and the per-phase bookkeeping the state machine needs:
/// latches that make every phase's entry action fire once, and a separate
/// dwell counter for each phase so no phase inherits another's ticks.

/// Ticks a door phase is held before the cycle moves on.
pub const DWELL_TICKS: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DoorStatus {
    #[default]
    Closed,
    Open,
    Overloaded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoorText {
    DoorOpen,
    DoorClose,
    Overloaded,
}

impl DoorText {
    pub fn as_str(self) -> &'static str {
        match self {
            DoorText::DoorOpen => "door-open",
            DoorText::DoorClose => "door-close",
            DoorText::Overloaded => "overloaded",
        }
    }

    /// Panel caption shown next to the floor indicator.
    pub fn caption(self) -> &'static str {
        match self {
            DoorText::DoorOpen => "开门",
            DoorText::DoorClose => "关门",
            DoorText::Overloaded => "超载",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoorPhase {
    Open,
    Overload,
    Close,
}

impl DoorPhase {
    fn index(self) -> usize {
        match self {
            DoorPhase::Open => 0,
            DoorPhase::Overload => 1,
            DoorPhase::Close => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DoorCycle {
    status: DoorStatus,
    door_open: bool,
    overloaded: bool,
    dwell: [u8; 3],
}

impl DoorCycle {
    pub fn new() -> Self {
        DoorCycle::default()
    }

    pub fn status(&self) -> DoorStatus {
        self.status
    }

    pub fn dwell(&self, phase: DoorPhase) -> u8 {
        self.dwell[phase.index()]
    }

    /// Entry action for a phase. Returns the text to show the first time
    /// it runs and `None` on every repeat until the latch is cleared.
    pub fn enter(&mut self, phase: DoorPhase) -> Option<DoorText> {
        match phase {
            DoorPhase::Open => {
                if self.door_open {
                    return None;
                }
                self.door_open = true;
                self.status = DoorStatus::Open;
                Some(DoorText::DoorOpen)
            }
            DoorPhase::Overload => {
                if self.overloaded {
                    return None;
                }
                self.overloaded = true;
                self.status = DoorStatus::Overloaded;
                Some(DoorText::Overloaded)
            }
            DoorPhase::Close => {
                if !self.door_open {
                    return None;
                }
                self.door_open = false;
                self.overloaded = false;
                self.status = DoorStatus::Closed;
                Some(DoorText::DoorClose)
            }
        }
    }

    /// Counts one tick in `phase`. Returns true once the phase has been
    /// held for `DWELL_TICKS`, resetting its counter.
    pub fn tick(&mut self, phase: DoorPhase) -> bool {
        let dwell = &mut self.dwell[phase.index()];
        *dwell += 1;
        if *dwell >= DWELL_TICKS {
            *dwell = 0;
            true
        } else {
            false
        }
    }
}
