//! `mazerun-hal` – Hardware Abstraction Layer
//!
//! The two seams between the navigation core and the robot:
//!
//! - [`sensor`] – [`SensorSource`][sensor::SensorSource]: delivers one
//!   [`SensorFrame`][mazerun_types::SensorFrame] (three forward proximity
//!   readings plus the emergency-stop button) per control period.
//! - [`drive`] – [`DriveBase`][drive::DriveBase]: accepts one
//!   [`WheelCommand`][mazerun_types::WheelCommand] per control period.
//! - [`sim`] – in-process replay sensor and recording drive base so the full
//!   stack can run in tests and CI without a robot attached.

pub mod drive;
pub mod sensor;
pub mod sim;

pub use drive::DriveBase;
pub use sensor::SensorSource;
pub use sim::{ReplaySensor, SimDriveBase, SimRig};
