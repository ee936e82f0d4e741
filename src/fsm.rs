/// ----- FSM MODULE -----
/// The main state machine. `transition` is a pure step function: it takes
/// the current control state and the latest tick value and returns the
/// next control state together with the side effects to apply. Nothing in
/// here touches the display directly.
///
/// Tick-gated states act at most once per distinct tick value, by comparing
/// the tick against the last value acted on. `Running` is evaluated on
/// every step so a new leg starts as soon as a setpoint floor is reached.

use tracing::{debug, info};

use crate::direction::Direction;
use crate::display::DisplayCommand;
use crate::doors::{DoorCycle, DoorPhase, DoorStatus, DoorText};
use crate::elevator::{FloorPosition, MAX_FLOOR};
use crate::timer::TickSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Init,
    DownTo10,
    DownTo1,
    UpTo30,
    UpTo68,
    DoorOpen,
    DoorClose,
    Running,
    Overload,
}

impl AppState {
    pub fn as_string(&self) -> String {
        match self {
            AppState::Init => String::from("init"),
            AppState::DownTo10 => String::from("downTo10"),
            AppState::DownTo1 => String::from("downTo1"),
            AppState::UpTo30 => String::from("upTo30"),
            AppState::UpTo68 => String::from("upTo68"),
            AppState::DoorOpen => String::from("doorOpen"),
            AppState::DoorClose => String::from("doorClose"),
            AppState::Running => String::from("running"),
            AppState::Overload => String::from("overload"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    StartTickSource,
    StartAdSequencer,
    Display(DisplayCommand),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Inputs {
    pub tick: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Control {
    pub state: AppState,
    pub floor: FloorPosition,
    pub doors: DoorCycle,
    pub last_observed: u32,
}

impl Control {
    pub fn new(floor: FloorPosition) -> Self {
        Control {
            state: AppState::Init,
            floor,
            doors: DoorCycle::new(),
            last_observed: 0,
        }
    }

    /// Consumes the tick if it has not been acted on yet.
    fn take_tick(&mut self, tick: u32) -> bool {
        if tick == self.last_observed {
            return false;
        }
        self.last_observed = tick;
        true
    }
}

pub fn transition(control: &Control, inputs: Inputs) -> (Control, Vec<Effect>) {
    let mut next = *control;
    let mut effects = Vec::new();

    match control.state {
        AppState::Init => {
            effects.push(Effect::StartTickSource);
            effects.push(Effect::StartAdSequencer);
            next.state = AppState::DoorOpen;
        }
        AppState::DownTo10 => travel(&mut next, &mut effects, inputs, Direction::Down, 10),
        AppState::DownTo1 => travel(&mut next, &mut effects, inputs, Direction::Down, 1),
        AppState::UpTo30 => travel(&mut next, &mut effects, inputs, Direction::Up, 30),
        AppState::UpTo68 => travel(&mut next, &mut effects, inputs, Direction::Up, MAX_FLOOR),
        AppState::DoorOpen => {
            door_phase(&mut next, &mut effects, inputs, DoorPhase::Open, AppState::Overload)
        }
        AppState::Overload => {
            door_phase(&mut next, &mut effects, inputs, DoorPhase::Overload, AppState::DoorClose)
        }
        AppState::DoorClose => {
            door_phase(&mut next, &mut effects, inputs, DoorPhase::Close, AppState::Running)
        }
        AppState::Running => match next.floor.value() {
            13 | 68 => {
                effects.push(Effect::Display(DisplayCommand::Arrow(Direction::Down)));
                next.state = AppState::DownTo10;
            }
            10 => next.state = AppState::DownTo1,
            1 => {
                effects.push(Effect::Display(DisplayCommand::Arrow(Direction::Up)));
                next.state = AppState::UpTo30;
            }
            30 => next.state = AppState::UpTo68,
            _ => (),
        },
    }

    (next, effects)
}

fn travel(
    control: &mut Control,
    effects: &mut Vec<Effect>,
    inputs: Inputs,
    direction: Direction,
    target: u32,
) {
    if !control.take_tick(inputs.tick) {
        return;
    }
    let digits = match direction {
        Direction::Down => control.floor.descend(),
        Direction::Up => control.floor.ascend(),
    };
    effects.push(Effect::Display(DisplayCommand::Floor(digits)));
    if control.floor.value() == target {
        control.state = AppState::DoorOpen;
    }
}

fn door_phase(
    control: &mut Control,
    effects: &mut Vec<Effect>,
    inputs: Inputs,
    phase: DoorPhase,
    after: AppState,
) {
    if let Some(text) = control.doors.enter(phase) {
        effects.push(Effect::Display(DisplayCommand::DoorText(text)));
    }
    if control.take_tick(inputs.tick) && control.doors.tick(phase) {
        control.state = after;
    }
}

/// Owns all mutable simulation state. Lives on the scheduler thread.
#[derive(Debug, Clone)]
pub struct Simulation {
    control: Control,
    ticks: TickSource,
}

impl Simulation {
    pub fn new(start_floor: u32) -> Self {
        Simulation {
            control: Control::new(FloorPosition::new(start_floor)),
            ticks: TickSource::new(),
        }
    }

    pub fn state(&self) -> AppState {
        self.control.state
    }

    pub fn floor(&self) -> u32 {
        self.control.floor.value()
    }

    pub fn door_status(&self) -> DoorStatus {
        self.control.doors.status()
    }

    pub fn ticks(&self) -> &TickSource {
        &self.ticks
    }

    /// Called from the coarse interval timer.
    pub fn on_tick_interval(&mut self) {
        self.ticks.on_interval();
    }

    /// One scheduler firing. Starting the tick source is handled here;
    /// every other effect is returned for the caller to apply.
    pub fn step(&mut self) -> Vec<Effect> {
        let inputs = Inputs { tick: self.ticks.current() };
        let (next, mut effects) = transition(&self.control, inputs);

        if next.state != self.control.state {
            debug!(
                from = %self.control.state.as_string(),
                to = %next.state.as_string(),
                floor = next.floor.value(),
                tick = inputs.tick,
                "state transition"
            );
        }
        self.control = next;

        let ticks = &mut self.ticks;
        effects.retain(|effect| {
            if *effect == Effect::StartTickSource {
                ticks.start();
                info!("tick source started");
                false
            } else {
                true
            }
        });
        effects
    }

    /// Commands that paint the panel before the first step. The door
    /// label boots showing the overload caption.
    pub fn initial_display(&self) -> Vec<DisplayCommand> {
        vec![
            DisplayCommand::Floor(self.control.floor.digits()),
            DisplayCommand::Arrow(Direction::Down),
            DisplayCommand::DoorText(DoorText::Overloaded),
        ]
    }
}
