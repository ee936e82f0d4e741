/// ----- DISPLAY MODULE -----
/// The narrow interface the control loop and the ad banner draw through,
/// plus two implementations: a crossterm panel for interactive runs and a
/// tracing-backed one for headless runs.

use std::io::{stdout, Stdout, Write};

use crossterm::{cursor, execute, queue, style::Print, terminal, Result};
use tracing::{info, trace};

use crate::ads::AdGeometry;
use crate::direction::Direction;
use crate::doors::DoorText;
use crate::elevator::FloorDigits;

pub trait HallDisplay {
    fn set_floor_display(
        &mut self,
        tens_visible: bool,
        tens_digit: u8,
        ones_digit: u8,
        ones_centered: bool,
    );
    fn set_arrow_direction(&mut self, direction: Direction);
    fn set_door_text(&mut self, text: DoorText);
    fn set_ad_box_offset(&mut self, x: i32);
    fn set_ad_text(&mut self, text: &str);

    /// Pushes pending updates out. Called once per scheduler iteration.
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayCommand {
    Floor(FloorDigits),
    Arrow(Direction),
    DoorText(DoorText),
    AdOffset(i32),
    AdText(String),
}

impl DisplayCommand {
    pub fn apply(&self, display: &mut dyn HallDisplay) {
        match self {
            DisplayCommand::Floor(digits) => display.set_floor_display(
                digits.tens_visible,
                digits.tens_digit,
                digits.ones_digit,
                digits.ones_centered,
            ),
            DisplayCommand::Arrow(direction) => display.set_arrow_direction(*direction),
            DisplayCommand::DoorText(text) => display.set_door_text(*text),
            DisplayCommand::AdOffset(x) => display.set_ad_box_offset(*x),
            DisplayCommand::AdText(text) => display.set_ad_text(text),
        }
    }
}

/// Two digit slots. A single digit sits between them.
pub fn floor_label(digits: &FloorDigits) -> String {
    if digits.tens_visible {
        format!("{} {}", digits.tens_digit, digits.ones_digit)
    } else {
        format!(" {} ", digits.ones_digit)
    }
}

/// Lays the ad box onto a row of `columns` cells, scaling the pixel offset
/// and box width from screen space. Whatever falls off either edge is cut.
pub fn ad_row(offset: i32, text: &str, geometry: &AdGeometry, columns: u16) -> String {
    let columns = i64::from(columns);
    let screen_width = i64::from(geometry.screen_width.max(1));
    let start = i64::from(offset) * columns / screen_width;
    let box_columns = (i64::from(geometry.box_width) * columns / screen_width).max(2);

    let mut content: Vec<char> = Vec::with_capacity(box_columns as usize);
    content.push('[');
    content.extend(text.chars().take((box_columns - 2) as usize));
    while (content.len() as i64) < box_columns - 1 {
        content.push(' ');
    }
    content.push(']');

    let mut row = vec![' '; columns as usize];
    for (i, ch) in content.into_iter().enumerate() {
        let col = start + i as i64;
        if (0..columns).contains(&col) {
            row[col as usize] = ch;
        }
    }
    row.into_iter().collect()
}

#[derive(Debug, Clone)]
struct Panel {
    digits: FloorDigits,
    arrow: Direction,
    door_text: Option<DoorText>,
    ad_offset: i32,
    ad_text: String,
}

const PANEL_ROWS: u16 = 9;

pub struct TerminalDisplay {
    stdout: Stdout,
    geometry: AdGeometry,
    panel: Panel,
    dirty: bool,
}

impl TerminalDisplay {
    pub fn new(geometry: AdGeometry, initial: FloorDigits) -> Result<Self> {
        let mut stdout = stdout();
        terminal::enable_raw_mode()?;
        execute!(stdout, terminal::EnterAlternateScreen, cursor::Hide)?;
        Ok(TerminalDisplay {
            stdout,
            panel: Panel {
                digits: initial,
                arrow: Direction::Down,
                door_text: None,
                ad_offset: geometry.rest_offset,
                ad_text: String::new(),
            },
            geometry,
            dirty: true,
        })
    }

    fn draw(&mut self) -> Result<()> {
        let (columns, _) = terminal::size()?;
        let width = usize::from(columns.max(24)) - 2;
        let border = format!("+{}+", "-".repeat(width));

        let door = match self.panel.door_text {
            Some(text) => format!("{} {}", text.caption(), text.as_str()),
            None => String::new(),
        };
        let status = format!(
            " {}  {}    {}",
            self.panel.arrow.arrow(),
            floor_label(&self.panel.digits),
            door,
        );
        let ad = ad_row(self.panel.ad_offset, &self.panel.ad_text, &self.geometry, width as u16);

        let lines = [
            border.clone(),
            format!("|{:<width$}|", " ELEVATOR", width = width),
            border.clone(),
            format!("|{:<width$}|", status, width = width),
            border.clone(),
            format!("|{}|", ad),
            border,
            String::from(" press q to quit"),
        ];

        for (row, line) in lines.iter().enumerate() {
            queue!(
                self.stdout,
                cursor::MoveTo(0, row as u16),
                terminal::Clear(terminal::ClearType::CurrentLine),
                Print(line)
            )?;
        }
        queue!(self.stdout, cursor::MoveTo(0, PANEL_ROWS))?;
        self.stdout.flush()?;
        Ok(())
    }
}

impl HallDisplay for TerminalDisplay {
    fn set_floor_display(
        &mut self,
        tens_visible: bool,
        tens_digit: u8,
        ones_digit: u8,
        ones_centered: bool,
    ) {
        self.panel.digits = FloorDigits {
            tens_visible,
            tens_digit,
            ones_digit,
            ones_centered,
        };
        self.dirty = true;
    }

    fn set_arrow_direction(&mut self, direction: Direction) {
        self.panel.arrow = direction;
        self.dirty = true;
    }

    fn set_door_text(&mut self, text: DoorText) {
        self.panel.door_text = Some(text);
        self.dirty = true;
    }

    fn set_ad_box_offset(&mut self, x: i32) {
        if self.panel.ad_offset != x {
            self.panel.ad_offset = x;
            self.dirty = true;
        }
    }

    fn set_ad_text(&mut self, text: &str) {
        self.panel.ad_text = text.to_owned();
        self.dirty = true;
    }

    fn flush(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }
        self.dirty = false;
        self.draw()
    }
}

impl Drop for TerminalDisplay {
    fn drop(&mut self) {
        // best effort, the process is on its way out
        let _ = execute!(self.stdout, cursor::Show, terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

/// Headless collaborator: every update becomes a log event.
#[derive(Debug, Default)]
pub struct LogDisplay {
    last_offset: Option<i32>,
}

impl LogDisplay {
    pub fn new() -> Self {
        LogDisplay::default()
    }
}

impl HallDisplay for LogDisplay {
    fn set_floor_display(
        &mut self,
        tens_visible: bool,
        tens_digit: u8,
        ones_digit: u8,
        ones_centered: bool,
    ) {
        let digits = FloorDigits {
            tens_visible,
            tens_digit,
            ones_digit,
            ones_centered,
        };
        let label = floor_label(&digits);
        info!(floor = %label.trim(), ones_centered, "floor display");
    }

    fn set_arrow_direction(&mut self, direction: Direction) {
        info!(direction = %direction.as_string(), "arrow");
    }

    fn set_door_text(&mut self, text: DoorText) {
        info!(text = text.as_str(), caption = text.caption(), "door text");
    }

    fn set_ad_box_offset(&mut self, x: i32) {
        if self.last_offset != Some(x) {
            self.last_offset = Some(x);
            trace!(x, "ad box offset");
        }
    }

    fn set_ad_text(&mut self, text: &str) {
        info!(text, "ad text");
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;

    /// Collects every call as the command that would have produced it.
    #[derive(Debug, Default)]
    pub struct RecordingDisplay {
        pub commands: Vec<DisplayCommand>,
    }

    impl HallDisplay for RecordingDisplay {
        fn set_floor_display(
            &mut self,
            tens_visible: bool,
            tens_digit: u8,
            ones_digit: u8,
            ones_centered: bool,
        ) {
            self.commands.push(DisplayCommand::Floor(FloorDigits {
                tens_visible,
                tens_digit,
                ones_digit,
                ones_centered,
            }));
        }

        fn set_arrow_direction(&mut self, direction: Direction) {
            self.commands.push(DisplayCommand::Arrow(direction));
        }

        fn set_door_text(&mut self, text: DoorText) {
            self.commands.push(DisplayCommand::DoorText(text));
        }

        fn set_ad_box_offset(&mut self, x: i32) {
            self.commands.push(DisplayCommand::AdOffset(x));
        }

        fn set_ad_text(&mut self, text: &str) {
            self.commands.push(DisplayCommand::AdText(text.to_owned()));
        }
    }

    #[test]
    fn commands_reach_the_matching_operation() {
        let commands = vec![
            DisplayCommand::Floor(FloorDigits::of(7)),
            DisplayCommand::Arrow(Direction::Up),
            DisplayCommand::DoorText(DoorText::Overloaded),
            DisplayCommand::AdOffset(-12),
            DisplayCommand::AdText(String::from("hello")),
        ];
        let mut display = RecordingDisplay::default();
        for command in &commands {
            command.apply(&mut display);
        }
        assert_eq!(display.commands, commands);
    }

    #[test]
    fn floor_label_centers_single_digits() {
        assert_eq!(floor_label(&FloorDigits::of(13)), "1 3");
        assert_eq!(floor_label(&FloorDigits::of(4)), " 4 ");
    }

    fn geometry() -> AdGeometry {
        AdGeometry {
            screen_width: 100,
            box_width: 40,
            rest_offset: 0,
        }
    }

    #[test]
    fn ad_row_scales_offset_into_columns() {
        let row = ad_row(50, "hi", &geometry(), 20);
        assert_eq!(row.chars().count(), 20);
        assert_eq!(row, "          [hi    ]  ");
    }

    #[test]
    fn ad_row_clips_a_box_partly_off_screen() {
        let row = ad_row(-20, "abcdef", &geometry(), 20);
        assert_eq!(row, "def]                ");
    }

    #[test]
    fn ad_row_is_blank_when_fully_off_screen() {
        let row = ad_row(100, "abc", &geometry(), 20);
        assert_eq!(row.trim(), "");
    }
}
