// crates/orrery-core/src/control/planner.rs

use crate::axis::state::AxisState;

/// Caps per-cycle travel. Anything left over is picked up next cycle, when
/// the absolute target is recomputed from the clock.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MotionPlanner {
    max_steps_per_cycle: u32,
}

impl MotionPlanner {
    pub fn new(max_steps_per_cycle: u32) -> Self {
        Self {
            max_steps_per_cycle,
        }
    }

    pub fn max_steps_per_cycle(&self) -> u32 {
        self.max_steps_per_cycle
    }

    pub fn plan_move(&self, st: &AxisState, target_step_count: i64) -> i64 {
        let cap = i64::from(self.max_steps_per_cycle);
        (target_step_count - st.current_step_position).clamp(-cap, cap)
    }
}
