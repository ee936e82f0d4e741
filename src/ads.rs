/// ----- ADS MODULE -----
/// The scrolling advertisement banner. Lines are loaded once from a text
/// file; the sequencer then loops forever through four timed phases:
/// slide in, dwell, slide out (swapping to the next line as it starts),
/// dwell. Time is passed in by the caller so the whole cycle can be
/// driven deterministically.

use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::display::DisplayCommand;
use crate::error::AdError;

/// Exponential ease-out: fast start, long settle.
pub fn ease_out_expo(progress: f64) -> f64 {
    if progress >= 1.0 {
        1.0
    } else {
        1.0 - 2f64.powf(-10.0 * progress)
    }
}

/// A straight-line move between two offsets along the ease-out curve.
/// A reversed slide plays the curve backwards: slow start, fast finish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Slide {
    from: i32,
    to: i32,
    reversed: bool,
}

impl Slide {
    fn at(&self, progress: f64) -> i32 {
        let progress = progress.clamp(0.0, 1.0);
        let eased = if self.reversed {
            1.0 - ease_out_expo(1.0 - progress)
        } else {
            ease_out_expo(progress)
        };
        (f64::from(self.from) + f64::from(self.to - self.from) * eased).round() as i32
    }
}

/// Widths are validated to fit `i32` when the config is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdGeometry {
    pub screen_width: u32,
    pub box_width: u32,
    /// Where the box sits before the first slide starts.
    pub rest_offset: i32,
}

impl AdGeometry {
    /// Fully off the right edge.
    pub fn max_x(&self) -> i32 {
        self.screen_width as i32
    }

    /// Fully off the left edge.
    pub fn min_x(&self) -> i32 {
        -(self.box_width as i32)
    }

    /// Horizontally centered.
    pub fn half(&self) -> i32 {
        (self.screen_width as i32 - self.box_width as i32) / 2
    }
}

impl Default for AdGeometry {
    fn default() -> Self {
        AdGeometry {
            screen_width: 768,
            box_width: 680,
            rest_offset: 30,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdTiming {
    pub slide_in: Duration,
    pub dwell: Duration,
    pub slide_out: Duration,
}

impl Default for AdTiming {
    fn default() -> Self {
        AdTiming {
            slide_in: Duration::from_secs(3),
            dwell: Duration::from_secs(2),
            slide_out: Duration::from_secs(3),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdQueue {
    lines: Vec<String>,
    next_index: usize,
}

impl AdQueue {
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        AdQueue {
            lines: lines
                .into_iter()
                .map(Into::into)
                .filter(|line: &String| !line.is_empty())
                .collect(),
            next_index: 0,
        }
    }

    pub fn load(path: &Path) -> Result<Self, AdError> {
        let contents = fs::read_to_string(path).map_err(|source| AdError::Unavailable {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(AdQueue::from_lines(contents.lines()))
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Returns the line under the cursor and moves the cursor on,
    /// wrapping at the end.
    pub fn rotate(&mut self) -> Option<&str> {
        if self.lines.is_empty() {
            return None;
        }
        let index = self.next_index;
        self.next_index = (self.next_index + 1) % self.lines.len();
        Some(self.lines[index].as_str())
    }
}

/// Reads the banner lines. A missing or unreadable source only disables
/// the banner.
pub fn load_ad_lines(path: &Path) -> AdQueue {
    match AdQueue::load(path) {
        Ok(queue) => {
            info!(path = %path.display(), lines = queue.len(), "loaded ad lines");
            queue
        }
        Err(e) => {
            warn!(error = %e, "ad banner disabled");
            AdQueue::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationPhase {
    SlideIn,
    Dwell1,
    SlideOut,
    Dwell2,
}

impl AnimationPhase {
    pub fn next(self) -> Self {
        match self {
            AnimationPhase::SlideIn => AnimationPhase::Dwell1,
            AnimationPhase::Dwell1 => AnimationPhase::SlideOut,
            AnimationPhase::SlideOut => AnimationPhase::Dwell2,
            AnimationPhase::Dwell2 => AnimationPhase::SlideIn,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AdSequencer {
    queue: AdQueue,
    geometry: AdGeometry,
    timing: AdTiming,
    phase: AnimationPhase,
    phase_started: Instant,
    phase_entered: bool,
    cycles: u64,
}

impl AdSequencer {
    /// `None` when there is nothing to show.
    pub fn start(
        queue: AdQueue,
        geometry: AdGeometry,
        timing: AdTiming,
        now: Instant,
    ) -> Option<Self> {
        if queue.is_empty() {
            return None;
        }
        info!(lines = queue.len(), "ad sequencer started");
        Some(AdSequencer {
            queue,
            geometry,
            timing,
            phase: AnimationPhase::SlideIn,
            phase_started: now,
            phase_entered: false,
            cycles: 0,
        })
    }

    pub fn phase(&self) -> AnimationPhase {
        self.phase
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    fn duration(&self, phase: AnimationPhase) -> Duration {
        match phase {
            AnimationPhase::SlideIn => self.timing.slide_in,
            AnimationPhase::Dwell1 | AnimationPhase::Dwell2 => self.timing.dwell,
            AnimationPhase::SlideOut => self.timing.slide_out,
        }
    }

    fn slide(&self, phase: AnimationPhase) -> Option<Slide> {
        match phase {
            AnimationPhase::SlideIn => Some(Slide {
                from: self.geometry.max_x(),
                to: self.geometry.half(),
                reversed: false,
            }),
            AnimationPhase::SlideOut => Some(Slide {
                from: self.geometry.half() + 1,
                to: self.geometry.min_x(),
                reversed: true,
            }),
            AnimationPhase::Dwell1 | AnimationPhase::Dwell2 => None,
        }
    }

    /// Brings the animation up to `now`. Phases that ended since the last
    /// call are completed in order, so a late call never skips a text swap.
    pub fn advance(&mut self, now: Instant) -> Vec<DisplayCommand> {
        let mut commands = Vec::new();
        loop {
            if !self.phase_entered {
                self.phase_entered = true;
                if self.phase == AnimationPhase::SlideOut {
                    // the slide-out starts at its own start value: swap text here
                    if let Some(line) = self.queue.rotate() {
                        commands.push(DisplayCommand::AdText(line.to_owned()));
                    }
                }
            }

            let duration = self.duration(self.phase);
            let elapsed = now.saturating_duration_since(self.phase_started);
            let slide = self.slide(self.phase);

            if elapsed < duration {
                if let Some(slide) = slide {
                    let progress = elapsed.as_secs_f64() / duration.as_secs_f64();
                    commands.push(DisplayCommand::AdOffset(slide.at(progress)));
                }
                break;
            }

            if let Some(slide) = slide {
                commands.push(DisplayCommand::AdOffset(slide.to));
            }
            self.phase_started += duration;
            self.phase = self.phase.next();
            self.phase_entered = false;
            if self.phase == AnimationPhase::SlideIn {
                self.cycles += 1;
                debug!(cycles = self.cycles, "ad cycle complete");
            }
        }
        commands
    }
}
