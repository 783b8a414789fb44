// crates/orrery-core/src/control/mapper.rs
//
// Angle <-> step mapping relative to the homed origin.
//
//   target angle  = normalize(raw - reference)
//   slot          = floor(angle * spr / 360) mod spr
//   target steps  = the step count with that slot nearest the current count;
//                   exactly half a revolution resolves to the lower count.

use crate::angle::{Angle, FULL_TURN_DEG};
use crate::axis::state::{Axis, AxisState};
use crate::ephemeris::RawAngles;
use crate::error::{ControlError, Result};

/// Absorbs floating error such as 89.99999999 / 1.8 landing just under a slot.
const SLOT_EPSILON: f64 = 1e-9;

/// Raw angles of the mechanical zero (winter solstice, prime meridian facing
/// the sun). Immutable once set.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReferencePose {
    pub orbital: Angle,
    pub rotation: Angle,
}

impl ReferencePose {
    #[inline]
    pub fn get(&self, axis: Axis) -> Angle {
        match axis {
            Axis::Orbital => self.orbital,
            Axis::Rotation => self.rotation,
        }
    }
}

impl From<RawAngles> for ReferencePose {
    fn from(raw: RawAngles) -> Self {
        Self {
            orbital: raw.orbital,
            rotation: raw.rotation,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct AngleMapper {
    reference: Option<ReferencePose>,
}

impl AngleMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the reference pose. Callable exactly once.
    pub fn initialize_reference(&mut self, raw: RawAngles) -> Result<()> {
        if self.reference.is_some() {
            return Err(ControlError::ReferenceAlreadySet);
        }
        self.reference = Some(raw.into());
        Ok(())
    }

    pub fn reference(&self) -> Option<ReferencePose> {
        self.reference
    }

    pub fn target_angle(&self, raw: &RawAngles, axis: Axis) -> Result<Angle> {
        let reference = self.reference.ok_or(ControlError::ReferenceNotSet)?;
        Ok(raw.get(axis).wrapping_sub(reference.get(axis)))
    }

    /// Step count for `target` nearest the axis's current position.
    pub fn target_step_count(&self, st: &AxisState, target: Angle) -> Result<i64> {
        if !st.homed {
            return Err(ControlError::NotHomed(st.axis));
        }
        let spr = i64::from(st.steps_per_revolution);
        let slot = angle_to_slot(target, st.steps_per_revolution);

        let rel = st.relative_steps();
        let revolution_start = rel - rel.rem_euclid(spr);
        let here = revolution_start + slot;

        // Ascending order with a strict comparison keeps the lower count on ties.
        let mut best = here - spr;
        for candidate in [here, here + spr] {
            if (candidate - rel).abs() < (best - rel).abs() {
                best = candidate;
            }
        }
        Ok(st.zero_step_position + best)
    }

    /// Angle the axis currently points at, relative to the homed origin.
    pub fn angle_of(&self, st: &AxisState) -> Result<Angle> {
        if !st.homed {
            return Err(ControlError::NotHomed(st.axis));
        }
        Ok(slot_to_angle(st.slot(), st.steps_per_revolution))
    }
}

pub fn angle_to_slot(angle: Angle, steps_per_revolution: u32) -> i64 {
    let spr = f64::from(steps_per_revolution);
    let exact = angle.degrees() * spr / FULL_TURN_DEG;
    ((exact + SLOT_EPSILON).floor() as i64).rem_euclid(i64::from(steps_per_revolution))
}

pub fn slot_to_angle(slot: i64, steps_per_revolution: u32) -> Angle {
    Angle::from_degrees(slot as f64 * FULL_TURN_DEG / f64::from(steps_per_revolution))
}
