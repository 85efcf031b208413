//! [`Walker`] – sensor-driven corridor and intersection state machine.
//!
//! Called once per control period with the latest [`SensorFrame`], the
//! walker returns the [`WheelCommand`] for that period.  It
//!
//! 1. keeps the robot centred between corridor walls,
//! 2. notices side openings and dead ends ahead and remembers which side to
//!    wait on,
//! 3. judges when the robot is centred on that intersection, asks its
//!    [`Guide`] which way to go, and
//! 4. runs the chosen turn as an open-loop timed maneuver.
//!
//! # States
//!
//! | phase | `current_turn` | pending side |
//! |---|---|---|
//! | [`Cruising`][WalkerPhase::Cruising] | `STRAIGHT` | none |
//! | [`Approaching`][WalkerPhase::Approaching] | `STRAIGHT` | `LEFT`, `RIGHT` or `STRAIGHT` (dead end) |
//! | [`Maneuvering`][WalkerPhase::Maneuvering] | `LEFT`, `RIGHT` or `U_TURN` | none |
//! | [`Halted`][WalkerPhase::Halted] | `STOP` | none |
//!
//! `Halted` is terminal: build a new walker to drive again.
//!
//! # Arrival
//!
//! A side opening has been reached once the wall *beyond* it shows up again
//! on that side.  A dead end, or any intersection with a wall ahead, has been
//! reached once the center sensor reads the far wall as close enough.
//!
//! Openings seen while approaching accumulate; they are only dropped when
//! the front, briefly seen as open during the approach, turns out to be
//! blocked on arrival.

use std::time::Instant;

use mazerun_types::{Direction, SensorFrame, WheelCommand};
use tracing::{debug, info, warn};

use crate::calibration::WalkerCalibration;
use crate::guide::Guide;

/// Coarse state of the walker, derived from its [`SessionState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkerPhase {
    Cruising,
    Approaching,
    Maneuvering,
    Halted,
}

/// Mutable per-run state, written only by [`Walker::tick`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    /// `STRAIGHT` while driving a corridor, the turn being executed, or
    /// `STOP` once halted.
    pub current_turn: Direction,
    /// When the current maneuver began.
    pub turn_started_at: Option<Instant>,
    /// Side the walker is waiting to be centred on.
    pub pending: Option<Direction>,
    /// Openings seen since the pending intersection was first sighted.
    pub observed: Direction,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            current_turn: Direction::STRAIGHT,
            turn_started_at: None,
            pending: None,
            observed: Direction::STOP,
        }
    }
}

/// One guide consultation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecisionRecord {
    pub offered: Direction,
    pub chosen: Direction,
}

/// The navigation state machine.  Owns its guide and session state.
pub struct Walker {
    guide: Box<dyn Guide>,
    calibration: WalkerCalibration,
    state: SessionState,
    decisions: Vec<DecisionRecord>,
}

impl Walker {
    pub fn new(guide: Box<dyn Guide>, calibration: WalkerCalibration) -> Self {
        Self {
            guide,
            calibration,
            state: SessionState::default(),
            decisions: Vec::new(),
        }
    }

    pub fn calibration(&self) -> &WalkerCalibration {
        &self.calibration
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Every guide consultation so far, oldest first.
    pub fn decisions(&self) -> &[DecisionRecord] {
        &self.decisions
    }

    pub fn phase(&self) -> WalkerPhase {
        let turn = self.state.current_turn;
        if turn.is_stop() {
            WalkerPhase::Halted
        } else if turn.is_maneuver() {
            WalkerPhase::Maneuvering
        } else if self.state.pending.is_some() {
            WalkerPhase::Approaching
        } else {
            WalkerPhase::Cruising
        }
    }

    /// Advance the state machine by one control period.
    pub fn tick(&mut self, frame: &SensorFrame, now: Instant) -> WheelCommand {
        if frame.stop_requested && !self.state.current_turn.is_stop() {
            warn!("stop button pressed; halting");
            self.halt();
        }

        let turn = self.state.current_turn;
        if turn.is_stop() {
            WheelCommand::STOP
        } else if turn.is_maneuver() {
            self.continue_maneuver(turn, now)
        } else {
            self.follow_corridor(frame, now)
        }
    }

    fn halt(&mut self) {
        self.state = SessionState {
            current_turn: Direction::STOP,
            ..SessionState::default()
        };
    }

    fn continue_maneuver(&mut self, turn: Direction, now: Instant) -> WheelCommand {
        let started = self.state.turn_started_at.unwrap_or(now);
        let elapsed = now.saturating_duration_since(started);

        match self.calibration.maneuver(turn) {
            Some(maneuver) if elapsed < maneuver.duration => maneuver.command,
            _ => {
                info!(%turn, ?elapsed, "maneuver complete");
                self.state.current_turn = Direction::STRAIGHT;
                self.state.turn_started_at = None;
                self.calibration.cruise()
            }
        }
    }

    fn follow_corridor(&mut self, frame: &SensorFrame, now: Instant) -> WheelCommand {
        let cal = &self.calibration;
        let open_left = frame.left < cal.opening_threshold;
        let open_right = frame.right < cal.opening_threshold;
        let open_front = frame.center < cal.opening_threshold;
        let visible = Direction::from_openings(open_left, open_right, open_front);

        debug!(
            left = frame.left,
            center = frame.center,
            right = frame.right,
            %visible,
            "corridor reading"
        );

        // Centre between the walls only inside a plain corridor.
        let diff = frame.left.saturating_sub(frame.right);
        let command = if !open_left
            && !open_right
            && diff.saturating_abs() > cal.deadband
            && self.state.pending.is_none()
        {
            let correction = cal.correction(diff);
            WheelCommand::new(
                cal.cruise_speed.saturating_add(correction),
                cal.cruise_speed.saturating_sub(correction),
            )
        } else {
            cal.cruise()
        };

        let pending = self.state.pending;
        let arrived = if pending == Some(Direction::STRAIGHT) || !open_front {
            frame.center > cal.front_space_threshold
        } else if pending == Some(Direction::RIGHT) {
            frame.right > cal.on_intersection_threshold
        } else if pending == Some(Direction::LEFT) {
            frame.left > cal.on_intersection_threshold
        } else {
            false
        };

        if arrived {
            self.arrive(visible, open_front, now);
        } else if matches!(pending, None | Some(Direction::STRAIGHT)) {
            self.watch_for_intersection(visible);
        } else {
            let merged = self.state.observed | visible;
            if merged != self.state.observed {
                info!(
                    new = %merged.difference(self.state.observed),
                    options = %merged,
                    "found new direction(s)"
                );
                self.state.observed = merged;
            }
        }

        command
    }

    /// Decide which side to wait on.  A dead end ahead is awaited like an
    /// intersection but is overridden as soon as a real side opening shows.
    fn watch_for_intersection(&mut self, visible: Direction) {
        let next = if visible.contains(Direction::RIGHT) {
            Some(Direction::RIGHT)
        } else if visible.contains(Direction::LEFT) {
            Some(Direction::LEFT)
        } else if !visible.contains(Direction::STRAIGHT) {
            Some(Direction::STRAIGHT)
        } else {
            self.state.pending
        };

        if let Some(side) = next {
            if self.state.pending != next {
                info!(awaiting = %side, options = %visible, "intersection in sight");
            }
            self.state.pending = next;
            self.state.observed = visible;
        }
    }

    fn arrive(&mut self, visible: Direction, open_front: bool, now: Instant) {
        let mut offered = match self.state.pending.take() {
            Some(_) => self.state.observed,
            None => visible,
        };
        if offered.contains(Direction::STRAIGHT) && !open_front {
            info!("front is blocked on arrival; dropping STRAIGHT");
            offered.remove(Direction::STRAIGHT);
        }

        let chosen = self.guide.decide(offered);
        self.decisions.push(DecisionRecord { offered, chosen });
        info!(guide = self.guide.name(), %offered, %chosen, "on intersection");

        let chosen = if chosen.is_stop() || chosen.is_single() {
            chosen
        } else {
            warn!(%chosen, "guide answered more than one direction; halting");
            Direction::STOP
        };

        self.state.observed = Direction::STOP;
        self.state.current_turn = chosen;
        self.state.turn_started_at = chosen.is_maneuver().then_some(now);
        if chosen.is_stop() {
            info!("guide chose STOP; halting");
        }
    }
}
