//! `mazerun-runtime` – The navigation core
//!
//! Drives a differential-drive robot through a corridor maze from forward
//! proximity readings alone.
//!
//! # Modules
//!
//! - [`guide`] – [`Guide`][guide::Guide]: the decision policy consulted once
//!   per intersection, with [`StraightGuide`][guide::StraightGuide],
//!   [`RightHandGuide`][guide::RightHandGuide] and
//!   [`ScriptedGuide`][guide::ScriptedGuide] (replays the turns compiled by
//!   `mazerun-planner`).
//! - [`walker`] – [`Walker`][walker::Walker]: the per-tick state machine
//!   that keeps the robot centred, detects intersections and dead ends,
//!   consults the guide and times the turns.
//! - [`calibration`] – [`WalkerCalibration`][calibration::WalkerCalibration]:
//!   thresholds, speeds and the quarter-turn time for one platform.
//! - [`control_loop`] – [`ControlLoop`][control_loop::ControlLoop]: the
//!   fixed-rate sense/decide/actuate loop around a walker and the
//!   `mazerun-hal` collaborators.
//! - [`telemetry`] – [`init_tracing`][telemetry::init_tracing]: global
//!   `tracing` subscriber with optional OTLP export.

pub mod calibration;
pub mod control_loop;
pub mod guide;
pub mod telemetry;
pub mod walker;

pub use calibration::{Maneuver, WalkerCalibration};
pub use control_loop::{ControlLoop, ControlLoopConfig, ExitReason, Pacing, RunSummary};
pub use guide::{Guide, GuideKind, RightHandGuide, ScriptedGuide, StraightGuide};
pub use telemetry::{TracerProviderGuard, init_tracing};
pub use walker::{DecisionRecord, SessionState, Walker, WalkerPhase};
