/// ----- CONFIG MODULE -----
/// Settings come from an optional JSON file, then command line flags
/// override individual values.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use tracing::info;

use crate::ads::{AdGeometry, AdTiming};
use crate::elevator::{MAX_FLOOR, START_FLOOR};
use crate::error::ConfigError;

/// Simulated elevator hall display.
#[derive(Parser, Debug, Clone)]
#[command(name = "elevator-display")]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Path to the JSON configuration file
    #[arg(short, long, default_value = "config.json")]
    pub config: PathBuf,

    /// Ad text source, one line per banner message
    #[arg(long)]
    pub ads: Option<PathBuf>,

    /// Floor the car starts on
    #[arg(long)]
    pub start_floor: Option<u32>,

    /// Log display updates instead of drawing the terminal panel
    #[arg(long)]
    pub headless: bool,

    /// Stop after this many seconds
    #[arg(short, long)]
    pub duration: Option<u64>,
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct TimingSection {
    pub tick_interval_ms: u64,
    pub step_interval_ms: u64,
    pub frame_interval_ms: u64,
}

impl Default for TimingSection {
    fn default() -> Self {
        TimingSection {
            tick_interval_ms: 1000,
            step_interval_ms: 50,
            frame_interval_ms: 20,
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ElevatorSection {
    pub start_floor: u32,
}

impl Default for ElevatorSection {
    fn default() -> Self {
        ElevatorSection { start_floor: START_FLOOR }
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AdsSection {
    pub source: PathBuf,
    pub screen_width: u32,
    pub box_width: u32,
    pub rest_offset: i32,
    pub slide_in_ms: u64,
    pub dwell_ms: u64,
    pub slide_out_ms: u64,
}

impl Default for AdsSection {
    fn default() -> Self {
        let geometry = AdGeometry::default();
        let timing = AdTiming::default();
        AdsSection {
            source: PathBuf::from("taglines.txt"),
            screen_width: geometry.screen_width,
            box_width: geometry.box_width,
            rest_offset: geometry.rest_offset,
            slide_in_ms: timing.slide_in.as_millis() as u64,
            dwell_ms: timing.dwell.as_millis() as u64,
            slide_out_ms: timing.slide_out.as_millis() as u64,
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct ConfigFile {
    pub timing: TimingSection,
    pub elevator: ElevatorSection,
    pub ads: AdsSection,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub tick_interval: Duration,
    pub step_interval: Duration,
    pub frame_interval: Duration,
    pub start_floor: u32,
    pub ad_source: PathBuf,
    pub ad_geometry: AdGeometry,
    pub ad_timing: AdTiming,
    pub headless: bool,
    pub run_for: Option<Duration>,
}

fn read_config_file(path: &Path) -> Result<ConfigFile, ConfigError> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            info!(path = %path.display(), "no configuration file provided, using default settings");
            return Ok(ConfigFile::default());
        }
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn pixels(width: u32, name: &'static str) -> Result<u32, ConfigError> {
    if i32::try_from(width).is_err() {
        return Err(ConfigError::WidthOutOfRange(name, width));
    }
    Ok(width)
}

fn nonzero(ms: u64, name: &'static str) -> Result<Duration, ConfigError> {
    if ms == 0 {
        return Err(ConfigError::ZeroInterval(name));
    }
    Ok(Duration::from_millis(ms))
}

impl Config {
    pub fn get(args: &Args) -> Result<Self, ConfigError> {
        let config_file = read_config_file(&args.config)?;
        Config::resolve(config_file, args)
    }

    pub fn resolve(config_file: ConfigFile, args: &Args) -> Result<Self, ConfigError> {
        let start_floor = args.start_floor.unwrap_or(config_file.elevator.start_floor);
        if start_floor > MAX_FLOOR {
            return Err(ConfigError::StartFloorOutOfRange(start_floor));
        }

        let timing = &config_file.timing;
        let ads = &config_file.ads;

        Ok(Config {
            tick_interval: nonzero(timing.tick_interval_ms, "tick_interval_ms")?,
            step_interval: nonzero(timing.step_interval_ms, "step_interval_ms")?,
            frame_interval: nonzero(timing.frame_interval_ms, "frame_interval_ms")?,
            start_floor,
            ad_source: args.ads.clone().unwrap_or_else(|| ads.source.clone()),
            ad_geometry: AdGeometry {
                screen_width: pixels(ads.screen_width, "screen_width")?,
                box_width: pixels(ads.box_width, "box_width")?,
                rest_offset: ads.rest_offset,
            },
            ad_timing: AdTiming {
                slide_in: nonzero(ads.slide_in_ms, "slide_in_ms")?,
                dwell: nonzero(ads.dwell_ms, "dwell_ms")?,
                slide_out: nonzero(ads.slide_out_ms, "slide_out_ms")?,
            },
            headless: args.headless,
            run_for: args.duration.map(Duration::from_secs),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["elevator-display"];
        argv.extend_from_slice(extra);
        Args::parse_from(argv)
    }

    #[test]
    fn defaults_match_the_reference_panel() {
        let config = Config::resolve(ConfigFile::default(), &args(&[])).unwrap();
        assert_eq!(config.tick_interval, Duration::from_millis(1000));
        assert_eq!(config.step_interval, Duration::from_millis(50));
        assert_eq!(config.start_floor, 13);
        assert_eq!(config.ad_source, PathBuf::from("taglines.txt"));
        assert_eq!(config.ad_geometry, AdGeometry::default());
        assert_eq!(config.ad_timing, AdTiming::default());
        assert!(!config.headless);
        assert_eq!(config.run_for, None);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let json = r#"{ "timing": { "step_interval_ms": 10 }, "ads": { "box_width": 400 } }"#;
        let file: ConfigFile = serde_json::from_str(json).unwrap();
        assert_eq!(file.timing.step_interval_ms, 10);
        assert_eq!(file.timing.tick_interval_ms, 1000);
        assert_eq!(file.ads.box_width, 400);
        assert_eq!(file.ads.screen_width, 768);
        assert_eq!(file.elevator.start_floor, 13);
    }

    #[test]
    fn flags_override_the_file() {
        let mut file = ConfigFile::default();
        file.elevator.start_floor = 30;
        let config = Config::resolve(
            file,
            &args(&["--start-floor", "1", "--ads", "ads.txt", "--headless", "-d", "5"]),
        )
        .unwrap();
        assert_eq!(config.start_floor, 1);
        assert_eq!(config.ad_source, PathBuf::from("ads.txt"));
        assert!(config.headless);
        assert_eq!(config.run_for, Some(Duration::from_secs(5)));
    }

    #[test]
    fn rejects_start_floor_above_the_top() {
        let err =
            Config::resolve(ConfigFile::default(), &args(&["--start-floor", "69"])).unwrap_err();
        assert!(matches!(err, ConfigError::StartFloorOutOfRange(69)));
    }

    #[test]
    fn rejects_zero_intervals() {
        let mut file = ConfigFile::default();
        file.ads.dwell_ms = 0;
        let err = Config::resolve(file, &args(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::ZeroInterval("dwell_ms")));
    }

    #[test]
    fn rejects_widths_past_the_offset_range() {
        let mut file = ConfigFile::default();
        file.ads.box_width = u32::MAX;
        let err = Config::resolve(file, &args(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::WidthOutOfRange("box_width", u32::MAX)));

        let mut file = ConfigFile::default();
        file.ads.screen_width = i32::MAX as u32;
        assert!(Config::resolve(file, &args(&[])).is_ok());
    }

    #[test]
    fn missing_file_means_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let file = read_config_file(&dir.path().join("config.json")).unwrap();
        assert_eq!(file, ConfigFile::default());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        let err = read_config_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn get_reads_the_named_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "elevator": {{ "start_floor": 68 }} }}"#).unwrap();
        let path = file.path().to_str().unwrap().to_owned();
        let config = Config::get(&args(&["--config", path.as_str()])).unwrap();
        assert_eq!(config.start_floor, 68);
    }
}
