//! [`ControlLoop`] – fixed-rate sense → decide → actuate cycle.
//!
//! Each tick reads one [`SensorFrame`][mazerun_types::SensorFrame] from the
//! [`SensorSource`], passes it to the [`Walker`], and writes the resulting
//! command to the [`DriveBase`].  Ticks run back to back on the calling
//! thread; nothing inside a tick blocks.
//!
//! The loop ends when the walker halts, the shared shutdown flag is raised,
//! the optional tick limit is reached, or a collaborator fails.  On every
//! exit path both wheels are commanded to zero.  I/O failures are not
//! retried.
//!
//! # Example
//!
//! ```rust
//! use mazerun_hal::SimRig;
//! use mazerun_runtime::control_loop::{ControlLoop, ControlLoopConfig, ExitReason, Pacing};
//! use mazerun_runtime::{RightHandGuide, Walker, WalkerCalibration};
//! use mazerun_types::SensorFrame;
//!
//! let (sensor, drive) = SimRig::builder()
//!     .with_repeated(SensorFrame::new(300, 50, 300), 10)
//!     .build();
//! let walker = Walker::new(Box::new(RightHandGuide), WalkerCalibration::default());
//! let mut control = ControlLoop::new(walker, sensor, drive, ControlLoopConfig::default());
//!
//! let summary = control.run(Pacing::Virtual).unwrap();
//! assert_eq!(summary.exit, ExitReason::Halted);
//! ```

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::thread;
use std::time::{Duration, Instant};

use mazerun_hal::{DriveBase, SensorSource};
use mazerun_types::{MazeError, WheelCommand};
use tracing::{error, info};

use crate::walker::{DecisionRecord, Walker, WalkerPhase};

/// Configuration bundle for [`ControlLoop`].
#[derive(Debug, Clone)]
pub struct ControlLoopConfig {
    /// Time between ticks.
    pub tick_period: Duration,
    /// Stop after this many ticks.  `None` runs until halted.
    pub max_ticks: Option<u64>,
}

impl Default for ControlLoopConfig {
    fn default() -> Self {
        Self {
            tick_period: Duration::from_millis(80),
            max_ticks: None,
        }
    }
}

/// How [`ControlLoop::run`] spaces ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pacing {
    /// Sleep out the rest of each period and use the wall clock.
    RealTime,
    /// Advance a synthetic clock by one period per tick without sleeping.
    Virtual,
}

/// Why [`ControlLoop::run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// The walker reached `STOP` (guide decision or stop button).
    Halted,
    /// The shutdown flag was raised from outside.
    Shutdown,
    /// [`ControlLoopConfig::max_ticks`] was reached.
    TickLimit,
}

/// Outcome of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub ticks: u64,
    pub exit: ExitReason,
    pub decisions: Vec<DecisionRecord>,
}

/// Owns the walker and its two hardware collaborators for one run.
pub struct ControlLoop<S, D> {
    walker: Walker,
    sensor: S,
    drive: D,
    config: ControlLoopConfig,
    shutdown: Arc<AtomicBool>,
    ticks: u64,
}

impl<S: SensorSource, D: DriveBase> ControlLoop<S, D> {
    pub fn new(walker: Walker, sensor: S, drive: D, config: ControlLoopConfig) -> Self {
        Self {
            walker,
            sensor,
            drive,
            config,
            shutdown: Arc::new(AtomicBool::new(false)),
            ticks: 0,
        }
    }

    /// Use an externally owned shutdown flag (e.g. set from a Ctrl-C
    /// handler).
    pub fn with_shutdown(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown = flag;
        self
    }

    /// Handle that stops the loop before its next tick when set to `true`.
    pub fn shutdown_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    pub fn walker(&self) -> &Walker {
        &self.walker
    }

    pub fn drive(&self) -> &D {
        &self.drive
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Run one tick at time `now`.
    ///
    /// # Errors
    ///
    /// Propagates [`MazeError::SensorFault`] / [`MazeError::ActuatorFault`]
    /// after commanding the wheels to zero.
    pub fn step(&mut self, now: Instant) -> Result<WheelCommand, MazeError> {
        let frame = match self.sensor.read() {
            Ok(frame) => frame,
            Err(err) => return Err(self.abort(err)),
        };
        let command = self.walker.tick(&frame, now);
        if let Err(err) = self.drive.set_wheel_speeds(command) {
            return Err(self.abort(err));
        }
        self.ticks += 1;
        Ok(command)
    }

    /// Tick until the walker halts, shutdown is requested, or the tick limit
    /// is reached.
    ///
    /// # Errors
    ///
    /// Returns the first collaborator fault; the wheels have already been
    /// commanded to zero.
    pub fn run(&mut self, pacing: Pacing) -> Result<RunSummary, MazeError> {
        info!(
            sensor = self.sensor.id(),
            drive = self.drive.id(),
            period = ?self.config.tick_period,
            ?pacing,
            "control loop started"
        );
        let mut clock = Instant::now();

        let exit = loop {
            if self.shutdown.load(Ordering::SeqCst) {
                break ExitReason::Shutdown;
            }
            if let Some(limit) = self.config.max_ticks
                && self.ticks >= limit
            {
                break ExitReason::TickLimit;
            }

            let started = Instant::now();
            let now = match pacing {
                Pacing::RealTime => started,
                Pacing::Virtual => clock,
            };
            self.step(now)?;

            if self.walker.phase() == WalkerPhase::Halted {
                break ExitReason::Halted;
            }

            match pacing {
                Pacing::RealTime => {
                    thread::sleep(self.config.tick_period.saturating_sub(started.elapsed()))
                }
                Pacing::Virtual => clock += self.config.tick_period,
            }
        };

        if let Err(err) = self.drive.stop() {
            return Err(self.abort(err));
        }
        info!(ticks = self.ticks, ?exit, "control loop finished");

        Ok(RunSummary {
            ticks: self.ticks,
            exit,
            decisions: self.walker.decisions().to_vec(),
        })
    }

    /// Consume the loop and hand back its parts.
    pub fn into_parts(self) -> (Walker, S, D) {
        (self.walker, self.sensor, self.drive)
    }

    fn abort(&mut self, err: MazeError) -> MazeError {
        error!(%err, "control loop fault; stopping wheels");
        if let Err(stop_err) = self.drive.stop() {
            error!(err = %stop_err, "failed to stop wheels after fault");
        }
        err
    }
}
