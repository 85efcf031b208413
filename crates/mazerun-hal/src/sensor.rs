//! Generic `SensorSource` trait for the forward proximity array and the
//! emergency-stop button.

use mazerun_types::{MazeError, SensorFrame};

/// Periodic source of [`SensorFrame`]s.
///
/// Drivers implement this trait; the control loop calls
/// [`read`][SensorSource::read] exactly once per control period.
pub trait SensorSource: Send {
    /// Stable identifier for this source, e.g. `"prox_front"`.
    fn id(&self) -> &str;

    /// Return the latest sample.
    ///
    /// # Errors
    ///
    /// Returns [`MazeError::SensorFault`] if the sample cannot be read
    /// (e.g. the link to the robot dropped). Callers do not retry.
    fn read(&mut self) -> Result<SensorFrame, MazeError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedSensor {
        frame: SensorFrame,
    }

    impl SensorSource for FixedSensor {
        fn id(&self) -> &str {
            "fixed"
        }

        fn read(&mut self) -> Result<SensorFrame, MazeError> {
            Ok(self.frame)
        }
    }

    struct DeadSensor;

    impl SensorSource for DeadSensor {
        fn id(&self) -> &str {
            "dead"
        }

        fn read(&mut self) -> Result<SensorFrame, MazeError> {
            Err(MazeError::SensorFault {
                component: self.id().to_string(),
                details: "no response".to_string(),
            })
        }
    }

    #[test]
    fn fixed_sensor_repeats_frame() {
        let mut sensor = FixedSensor {
            frame: SensorFrame::new(300, 50, 310),
        };
        assert_eq!(sensor.read().unwrap(), SensorFrame::new(300, 50, 310));
        assert_eq!(sensor.read().unwrap(), SensorFrame::new(300, 50, 310));
    }

    #[test]
    fn dead_sensor_reports_fault() {
        let mut sensor = DeadSensor;
        let err = sensor.read().unwrap_err();
        assert!(matches!(err, MazeError::SensorFault { .. }));
        assert!(err.is_fatal());
    }
}
