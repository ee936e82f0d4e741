/// ----- ELEVATOR MODULE -----
/// Floor position and the navigator that walks it one floor per tick.
/// All movement is clamped to the shaft; running into either end is a
/// no-op, never an error.

pub const MIN_FLOOR: u32 = 0;
pub const MAX_FLOOR: u32 = 68;
pub const START_FLOOR: u32 = 13;

/// Arguments for the floor indicator. Single-digit floors hide the tens
/// digit and move the ones digit into the centered slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FloorDigits {
    pub tens_visible: bool,
    pub tens_digit: u8,
    pub ones_digit: u8,
    pub ones_centered: bool,
}

impl FloorDigits {
    pub fn of(floor: u32) -> Self {
        let tens_digit = ((floor / 10) % 10) as u8;
        let ones_digit = (floor % 10) as u8;
        if floor < 10 {
            FloorDigits {
                tens_visible: false,
                tens_digit,
                ones_digit,
                ones_centered: true,
            }
        } else {
            FloorDigits {
                tens_visible: true,
                tens_digit,
                ones_digit,
                ones_centered: false,
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FloorPosition {
    value: u32,
}

impl FloorPosition {
    pub fn new(value: u32) -> Self {
        FloorPosition {
            value: value.clamp(MIN_FLOOR, MAX_FLOOR),
        }
    }

    pub fn value(&self) -> u32 {
        self.value
    }

    /// Moves one floor down unless already at the bottom. The display is
    /// refreshed either way.
    pub fn descend(&mut self) -> FloorDigits {
        if self.value > MIN_FLOOR {
            self.value -= 1;
        }
        FloorDigits::of(self.value)
    }

    /// Moves one floor up unless already at the top.
    pub fn ascend(&mut self) -> FloorDigits {
        if self.value < MAX_FLOOR {
            self.value += 1;
        }
        FloorDigits::of(self.value)
    }

    pub fn digits(&self) -> FloorDigits {
        FloorDigits::of(self.value)
    }
}

impl Default for FloorPosition {
    fn default() -> Self {
        FloorPosition::new(START_FLOOR)
    }
}
