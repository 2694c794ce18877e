//! Vehicle kinematic state and the sensor bundle that updates it.
//!
//! The simulator reports one [`SensorBundle`] per tick. Every channel is
//! optional: sensors run at their own rates, so a tick may arrive with some
//! channels missing. A partial bundle is a representable state, not an error.
//! [`VehicleState::apply`] only commits a bundle when every required channel
//! is present and well-formed; otherwise the previous state is carried forward.

/// Total range readings across all range-finder groups.
pub const LASER_COUNT: usize = 14;

/// Readings per range-finder group, in observation order.
const LASER_GROUPS: [(&str, usize); 5] = [
    ("horizontal", 8),
    ("up", 1),
    ("down", 1),
    ("up_inclined", 2),
    ("down_inclined", 2),
];

/// Rotation sensor reports angles in (-180, 180]; the reward expects [0, 360).
const ROTATION_OFFSET_DEG: f32 = 180.0;

/// Sensor readings delivered by one simulator tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SensorBundle {
    /// Homogeneous 4×4 pose matrix, row-major. Translation in column 3.
    pub pose: Option<[[f32; 4]; 4]>,
    /// Linear velocity (m/s).
    pub velocity: Option<[f32; 3]>,
    /// Roll, pitch, yaw in degrees as reported by the sensor.
    pub rotation: Option<[f32; 3]>,
    pub horizontal_range: Option<Vec<f32>>,
    pub up_range: Option<Vec<f32>>,
    pub down_range: Option<Vec<f32>>,
    pub up_inclined_range: Option<Vec<f32>>,
    pub down_inclined_range: Option<Vec<f32>>,
}

impl SensorBundle {
    /// Names of required channels that are absent or have the wrong arity.
    pub fn missing_channels(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.pose.is_none() {
            missing.push("pose");
        }
        if self.velocity.is_none() {
            missing.push("velocity");
        }
        if self.rotation.is_none() {
            missing.push("rotation");
        }
        for ((name, expected), channel) in LASER_GROUPS.iter().zip(self.range_groups()) {
            match channel {
                Some(readings) if readings.len() == *expected => {}
                _ => missing.push(name),
            }
        }
        missing
    }

    /// True when every channel required for a state update is present.
    pub fn is_complete(&self) -> bool {
        self.missing_channels().is_empty()
    }

    fn range_groups(&self) -> [Option<&Vec<f32>>; 5] {
        [
            self.horizontal_range.as_ref(),
            self.up_range.as_ref(),
            self.down_range.as_ref(),
            self.up_inclined_range.as_ref(),
            self.down_inclined_range.as_ref(),
        ]
    }
}

/// Kinematic state of the vehicle as seen by the learner.
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleState {
    pub pose: [[f32; 4]; 4],
    /// Roll, pitch, yaw in degrees, offset into [0, 360).
    pub rotation: [f32; 3],
    pub velocity: [f32; 3],
    pub lasers: Vec<f32>,
    pub location: [f32; 3],
    /// Location at the previous reward evaluation.
    pub prev_location: [f32; 3],
}

impl Default for VehicleState {
    fn default() -> Self {
        Self {
            pose: [[0.0; 4]; 4],
            rotation: [0.0; 3],
            velocity: [0.0; 3],
            lasers: vec![0.0; LASER_COUNT],
            location: [0.0; 3],
            prev_location: [0.0; 3],
        }
    }
}

impl VehicleState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commit a sensor bundle.
    ///
    /// Returns `false` and leaves the state untouched if any required channel
    /// is missing. `prev_location` is never touched here; the driving loop
    /// advances it after the reward has been evaluated.
    pub fn apply(&mut self, bundle: &SensorBundle) -> bool {
        let missing = bundle.missing_channels();
        if !missing.is_empty() {
            log::debug!("Skipping state update, missing channels: {:?}", missing);
            return false;
        }

        let (Some(pose), Some(velocity), Some(rotation)) =
            (bundle.pose, bundle.velocity, bundle.rotation)
        else {
            return false;
        };

        self.pose = pose;
        self.location = [pose[0][3], pose[1][3], pose[2][3]];
        self.rotation = rotation.map(|angle| angle + ROTATION_OFFSET_DEG);
        self.velocity = velocity;
        self.lasers = bundle
            .range_groups()
            .into_iter()
            .flatten()
            .flat_map(|group| group.iter().copied())
            .collect();
        true
    }

    /// Advance `prev_location` to the current location.
    pub fn commit_location(&mut self) {
        self.prev_location = self.location;
    }

    /// Flattened observation: pose ‖ rotation ‖ velocity ‖ lasers.
    pub fn observation(&self) -> Vec<f32> {
        let mut obs = Vec::with_capacity(16 + 3 + 3 + self.lasers.len());
        obs.extend(self.pose.iter().flatten());
        obs.extend(self.rotation);
        obs.extend(self.velocity);
        obs.extend(&self.lasers);
        obs
    }
}
