/// ----- SCHEDULER MODULE -----
/// The single cooperative thread everything runs on. Three periodic
/// sources feed one `select!` loop: the coarse tick, the state machine
/// step, and the ad animation frame. No callback blocks and no state is
/// shared with another thread.

use std::path::PathBuf;
use std::time::Instant;

use crossbeam_channel::{after, never, select, tick, Receiver};
use tracing::{debug, info};

use crate::ads::{load_ad_lines, AdGeometry, AdSequencer, AdTiming};
use crate::config::Config;
use crate::display::HallDisplay;
use crate::error::AppError;
use crate::fsm::{Effect, Simulation};

pub struct Scheduler {
    simulation: Simulation,
    ads: Option<AdSequencer>,
    ads_requested: bool,
    ad_source: PathBuf,
    ad_geometry: AdGeometry,
    ad_timing: AdTiming,
}

impl Scheduler {
    pub fn new(config: &Config) -> Self {
        Scheduler {
            simulation: Simulation::new(config.start_floor),
            ads: None,
            ads_requested: false,
            ad_source: config.ad_source.clone(),
            ad_geometry: config.ad_geometry,
            ad_timing: config.ad_timing,
        }
    }

    pub fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    pub fn ads(&self) -> Option<&AdSequencer> {
        self.ads.as_ref()
    }

    pub fn paint_initial(&self, display: &mut dyn HallDisplay) {
        for command in self.simulation.initial_display() {
            command.apply(display);
        }
    }

    pub fn on_tick_interval(&mut self) {
        self.simulation.on_tick_interval();
    }

    pub fn on_step(&mut self, now: Instant, display: &mut dyn HallDisplay) {
        for effect in self.simulation.step() {
            match effect {
                Effect::Display(command) => command.apply(display),
                Effect::StartAdSequencer => self.start_ads(now),
                Effect::StartTickSource => (),
            }
        }
    }

    pub fn on_frame(&mut self, now: Instant, display: &mut dyn HallDisplay) {
        if let Some(ads) = self.ads.as_mut() {
            for command in ads.advance(now) {
                command.apply(display);
            }
        }
    }

    /// Fire and forget: the banner is loaded once and then runs on its own.
    fn start_ads(&mut self, now: Instant) {
        if self.ads_requested {
            return;
        }
        self.ads_requested = true;
        let queue = load_ad_lines(&self.ad_source);
        self.ads = AdSequencer::start(queue, self.ad_geometry, self.ad_timing, now);
        if self.ads.is_none() {
            debug!("no ad lines, banner stays idle");
        }
    }
}

pub fn run(
    config: &Config,
    display: &mut dyn HallDisplay,
    quit_rx: Receiver<()>,
) -> Result<(), AppError> {
    let mut scheduler = Scheduler::new(config);
    scheduler.paint_initial(display);
    display.flush()?;

    let seconds = tick(config.tick_interval);
    let steps = tick(config.step_interval);
    let frames = tick(config.frame_interval);
    let deadline = match config.run_for {
        Some(duration) => after(duration),
        None => never(),
    };

    loop {
        select! {
            recv(seconds) -> _ => scheduler.on_tick_interval(),
            recv(steps) -> msg => {
                if let Ok(now) = msg {
                    scheduler.on_step(now, display);
                }
            },
            recv(frames) -> msg => {
                if let Ok(now) = msg {
                    scheduler.on_frame(now, display);
                }
            },
            recv(quit_rx) -> _ => {
                info!("quit requested");
                return Ok(());
            },
            recv(deadline) -> _ => {
                info!(
                    floor = scheduler.simulation().floor(),
                    state = %scheduler.simulation().state().as_string(),
                    "run duration elapsed"
                );
                return Ok(());
            },
        }
        display.flush()?;
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::time::Duration;

    use super::*;
    use crate::ads::AnimationPhase;
    use crate::config::{Args, ConfigFile};
    use crate::direction::Direction;
    use crate::display::tests::RecordingDisplay;
    use crate::display::DisplayCommand;
    use crate::doors::DoorText;
    use crate::elevator::FloorDigits;
    use crate::fsm::AppState;
    use clap::Parser;

    fn config_with_ads(path: PathBuf) -> Config {
        let args = Args::parse_from(["elevator-display", "--headless"]);
        let mut config = Config::resolve(ConfigFile::default(), &args).unwrap();
        config.ad_source = path;
        config
    }

    #[test]
    fn initial_paint_shows_start_floor_arrow_and_overload_caption() {
        let dir = tempfile::tempdir().unwrap();
        let scheduler = Scheduler::new(&config_with_ads(dir.path().join("none.txt")));
        let mut display = RecordingDisplay::default();
        scheduler.paint_initial(&mut display);
        assert_eq!(
            display.commands,
            vec![
                DisplayCommand::Floor(FloorDigits::of(13)),
                DisplayCommand::Arrow(Direction::Down),
                DisplayCommand::DoorText(DoorText::Overloaded),
            ]
        );
    }

    #[test]
    fn first_steps_start_ads_and_open_the_door() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "A\nB").unwrap();
        let mut scheduler = Scheduler::new(&config_with_ads(file.path().to_path_buf()));
        let mut display = RecordingDisplay::default();
        let t0 = Instant::now();

        scheduler.on_step(t0, &mut display);
        assert_eq!(scheduler.simulation().state(), AppState::DoorOpen);
        assert!(display.commands.is_empty());
        assert_eq!(scheduler.ads().map(|ads| ads.phase()), Some(AnimationPhase::SlideIn));

        scheduler.on_step(t0, &mut display);
        assert_eq!(display.commands, vec![DisplayCommand::DoorText(DoorText::DoorOpen)]);

        scheduler.on_frame(t0 + Duration::from_secs(5), &mut display);
        assert!(display.commands.contains(&DisplayCommand::AdText(String::from("A"))));
    }

    #[test]
    fn missing_ad_source_leaves_the_banner_idle() {
        let dir = tempfile::tempdir().unwrap();
        let mut scheduler = Scheduler::new(&config_with_ads(dir.path().join("taglines.txt")));
        let mut display = RecordingDisplay::default();
        let t0 = Instant::now();
        scheduler.on_step(t0, &mut display);
        scheduler.on_frame(t0 + Duration::from_secs(1), &mut display);
        assert!(scheduler.ads().is_none());
        assert!(display.commands.is_empty());
    }

    #[test]
    fn ticks_drive_floor_updates_through_the_display() {
        let dir = tempfile::tempdir().unwrap();
        let mut scheduler = Scheduler::new(&config_with_ads(dir.path().join("none.txt")));
        let mut display = RecordingDisplay::default();
        let now = Instant::now();

        // door cycle: three phases of two ticks each, then the first leg
        for _ in 0..9 {
            for _ in 0..20 {
                scheduler.on_step(now, &mut display);
            }
            scheduler.on_tick_interval();
        }
        for _ in 0..20 {
            scheduler.on_step(now, &mut display);
        }

        let floors: Vec<u32> = display
            .commands
            .iter()
            .filter_map(|c| match c {
                DisplayCommand::Floor(d) => {
                    Some(u32::from(d.tens_digit) * 10 + u32::from(d.ones_digit))
                }
                _ => None,
            })
            .collect();
        assert_eq!(floors, vec![12, 11, 10]);
        assert!(display.commands.contains(&DisplayCommand::Arrow(Direction::Down)));
        assert_eq!(scheduler.simulation().state(), AppState::DoorOpen);
    }

    #[test]
    fn run_stops_at_the_deadline() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_with_ads(dir.path().join("none.txt"));
        config.run_for = Some(Duration::from_millis(400));
        let mut display = RecordingDisplay::default();
        run(&config, &mut display, never()).unwrap();
        assert!(display.commands.contains(&DisplayCommand::DoorText(DoorText::DoorOpen)));
    }
}
