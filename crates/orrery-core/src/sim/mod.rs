// crates/orrery-core/src/sim/mod.rs
//
// Simulated rig: one stepper-driven disc per axis with a magnet on it and a
// hall sensor fixed to the frame. The stepper and the sensor of an axis share
// the mechanism, the way the real motor and sensor share the physical disc.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::axis::actuator::StepperDriver;
use crate::axis::sensor::SensorDriver;
use crate::axis::state::Direction;
use crate::clock::Clock;
use crate::error::DriverFault;

#[derive(Clone, Debug)]
pub struct SimMechanism {
    steps_per_revolution: u32,
    /// Physical slot in [0, steps_per_revolution).
    position: i64,
    magnet_at: i64,
    magnet_width: u32,
    pulses: u64,
    fail_at_pulse: Option<u64>,
    sensor_connected: bool,
    released: bool,
    pulse_delay: Duration,
}

pub type SharedMechanism = Arc<Mutex<SimMechanism>>;

impl SimMechanism {
    /// Magnet one step wide at slot 0, disc resting at slot 0.
    pub fn new(steps_per_revolution: u32) -> Self {
        Self {
            steps_per_revolution: steps_per_revolution.max(1),
            position: 0,
            magnet_at: 0,
            magnet_width: 1,
            pulses: 0,
            fail_at_pulse: None,
            sensor_connected: true,
            released: true,
            pulse_delay: Duration::ZERO,
        }
    }

    pub fn with_position(mut self, slot: i64) -> Self {
        self.position = slot.rem_euclid(self.spr());
        self
    }

    /// Magnet covering `width` slots starting at `at`, in the forward direction.
    pub fn with_magnet(mut self, at: i64, width: u32) -> Self {
        self.magnet_at = at.rem_euclid(self.spr());
        self.magnet_width = width;
        self
    }

    pub fn with_pulse_delay(mut self, delay: Duration) -> Self {
        self.pulse_delay = delay;
        self
    }

    pub fn shared(self) -> SharedMechanism {
        Arc::new(Mutex::new(self))
    }

    fn spr(&self) -> i64 {
        i64::from(self.steps_per_revolution)
    }

    pub fn position(&self) -> i64 {
        self.position
    }

    pub fn pulses(&self) -> u64 {
        self.pulses
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    pub fn over_magnet(&self) -> bool {
        (self.position - self.magnet_at).rem_euclid(self.spr()) < i64::from(self.magnet_width)
    }

    /// Every pulse from the `n`-th one on (counted from now) faults.
    pub fn fail_after(&mut self, n: u64) {
        self.fail_at_pulse = Some(self.pulses + n);
    }

    pub fn clear_fault(&mut self) {
        self.fail_at_pulse = None;
    }

    pub fn disconnect_sensor(&mut self) {
        self.sensor_connected = false;
    }

    fn pulse(&mut self, dir: Direction) -> Result<(), DriverFault> {
        if self.fail_at_pulse.is_some_and(|limit| self.pulses >= limit) {
            return Err(DriverFault::new("motor stalled"));
        }
        self.position = (self.position + dir.sign()).rem_euclid(self.spr());
        self.pulses += 1;
        self.released = false;
        Ok(())
    }
}

fn lock(mech: &SharedMechanism) -> Result<MutexGuard<'_, SimMechanism>, DriverFault> {
    mech.lock()
        .map_err(|_| DriverFault::new("simulated mechanism lock poisoned"))
}

#[derive(Clone, Debug)]
pub struct SimStepper {
    mech: SharedMechanism,
}

impl SimStepper {
    pub fn new(mech: SharedMechanism) -> Self {
        Self { mech }
    }
}

impl StepperDriver for SimStepper {
    fn step_once(&mut self, dir: Direction) -> Result<(), DriverFault> {
        let delay = {
            let mut m = lock(&self.mech)?;
            m.pulse(dir)?;
            m.pulse_delay
        };
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
        Ok(())
    }

    fn release(&mut self) -> Result<(), DriverFault> {
        lock(&self.mech)?.released = true;
        Ok(())
    }
}

#[derive(Clone, Debug)]
pub struct SimHallSensor {
    mech: SharedMechanism,
}

impl SimHallSensor {
    pub fn new(mech: SharedMechanism) -> Self {
        Self { mech }
    }
}

impl SensorDriver for SimHallSensor {
    fn read(&mut self) -> Result<bool, DriverFault> {
        let m = lock(&self.mech)?;
        if !m.sensor_connected {
            return Err(DriverFault::new("hall sensor not responding"));
        }
        Ok(m.over_magnet())
    }
}

/// Build a mechanism plus the stepper and sensor drivers attached to it.
pub fn sim_axis(mech: SimMechanism) -> (SharedMechanism, SimStepper, SimHallSensor) {
    let shared = mech.shared();
    (
        shared.clone(),
        SimStepper::new(shared.clone()),
        SimHallSensor::new(shared),
    )
}

/// Clock whose sleeps advance simulated time instantly.
#[derive(Clone, Debug)]
pub struct SimulatedClock {
    now: DateTime<Utc>,
}

impl SimulatedClock {
    pub fn starting_at(now: DateTime<Utc>) -> Self {
        Self { now }
    }
}

impl Clock for SimulatedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }

    fn sleep(&mut self, d: Duration) {
        self.now += chrono::Duration::from_std(d).unwrap_or_else(|_| chrono::Duration::zero());
    }
}
