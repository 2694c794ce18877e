//! Expansion of the raw 5-element action into 8 thruster commands.
//!
//! Layout of the hovering vehicle's control scheme:
//! - channels 0..4: vertical thrusters, all driven by raw element 4
//! - channels 4..8: maneuvering thrusters, driven by raw elements 0..4

use super::transition::{ACTION_SIZE, THRUSTER_COUNT};

/// Index of the raw element shared by all vertical thrusters.
const VERTICAL_CHANNEL: usize = 4;

/// Physical command for one control tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThrusterCommand([f32; THRUSTER_COUNT]);

impl ThrusterCommand {
    /// Expand a raw policy action, scaling every channel by `gain`.
    ///
    /// # Panics
    ///
    /// Panics if `raw` does not have exactly [`ACTION_SIZE`] elements.
    pub fn from_raw_action(raw: &[f32], gain: f32) -> Self {
        assert_eq!(raw.len(), ACTION_SIZE, "raw action must have {} elements", ACTION_SIZE);

        let mut thrust = [0.0f32; THRUSTER_COUNT];
        thrust[..4].fill(raw[VERTICAL_CHANNEL] * gain);
        for (slot, value) in thrust[4..].iter_mut().zip(&raw[..4]) {
            *slot = value * gain;
        }
        Self(thrust)
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn into_array(self) -> [f32; THRUSTER_COUNT] {
        self.0
    }
}
