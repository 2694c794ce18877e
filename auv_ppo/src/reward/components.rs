//! Individual reward terms for underwater navigation.
//!
//! Every term is a pure function of one tick's kinematics except
//! [`StagnationTracker`], which carries a counter across ticks of an episode.
//! Terms return raw flags or magnitudes; weighting happens in
//! [`RewardComponents::total`](super::RewardComponents::total).

/// Euclidean distance between two points.
#[inline]
pub fn distance(a: &[f32; 3], b: &[f32; 3]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f32>()
        .sqrt()
}

// ============================================================================
// Operating Box
// ============================================================================

/// Axis-aligned operating volume.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    pub center: [f32; 3],
    /// Full side lengths on each axis.
    pub extent: [f32; 3],
}

impl BoundingBox {
    pub fn new(center: [f32; 3], extent: [f32; 3]) -> Self {
        Self { center, extent }
    }

    /// True if `location` lies outside the box on any axis.
    ///
    /// Points on a face count as inside.
    pub fn is_outside(&self, location: &[f32; 3]) -> bool {
        (0..3).any(|axis| {
            let half = self.extent[axis] / 2.0;
            let min = self.center[axis] - half;
            let max = self.center[axis] + half;
            location[axis] < min || location[axis] > max
        })
    }
}

// ============================================================================
// Range-Finder Terms
// ============================================================================

/// Any laser reading at or below `range` (contact).
#[inline]
pub fn collision(lasers: &[f32], range: f32) -> bool {
    lasers.iter().any(|&r| r <= range)
}

/// Any laser reading strictly below `range`.
///
/// Independent of [`collision`]: a contact reading also counts as a near miss.
#[inline]
pub fn near_miss(lasers: &[f32], range: f32) -> bool {
    lasers.iter().any(|&r| r < range)
}

// ============================================================================
// Attitude
// ============================================================================

/// Roll/pitch deviation from the hovering attitude, in raw degrees.
///
/// Angles are expected in [0, 360) after the sensor offset. The target
/// attitude is roll ≈ 0/360 and pitch ≈ 180; a 15° roll band and a 10° pitch
/// band around it are free. Angles outside the penalised open intervals
/// contribute nothing.
pub fn incline_deviation(roll: f32, pitch: f32) -> f32 {
    let mut deviation = 0.0;

    if roll > 15.0 && roll < 180.0 {
        deviation += roll - 15.0;
    } else if roll > 180.0 && roll < 345.0 {
        deviation += 345.0 - roll;
    }

    if pitch > 0.0 && pitch < 170.0 {
        deviation += 170.0 - pitch;
    } else if pitch > 190.0 && pitch < 360.0 {
        deviation += pitch - 190.0;
    }

    deviation
}

/// Scaled attitude penalty.
#[inline]
pub fn incline_penalty(rotation: &[f32; 3], scale: f32) -> f32 {
    incline_deviation(rotation[0], rotation[1]) * scale
}

// ============================================================================
// Target Terms
// ============================================================================

/// Distance to target decreased by more than `threshold` since the last tick.
#[inline]
pub fn distance_progress(
    prev_location: &[f32; 3],
    location: &[f32; 3],
    target: &[f32; 3],
    threshold: f32,
) -> bool {
    distance(prev_location, target) - distance(location, target) > threshold
}

/// Within `radius` of the target.
#[inline]
pub fn reach_target(location: &[f32; 3], target: &[f32; 3], radius: f32) -> bool {
    distance(location, target) < radius
}

// ============================================================================
// Stagnation
// ============================================================================

/// Counts consecutive ticks with negligible displacement.
///
/// Owned by one agent context; never shared between concurrent rollouts.
#[derive(Clone, Debug, PartialEq)]
pub struct StagnationTracker {
    min_displacement: f32,
    window: u32,
    counter: u32,
}

impl StagnationTracker {
    pub fn new(min_displacement: f32, window: u32) -> Self {
        Self {
            min_displacement,
            window,
            counter: 0,
        }
    }

    /// Record one tick and report whether the vehicle is stagnating.
    ///
    /// The counter resets the moment displacement reaches the threshold.
    pub fn update(&mut self, prev_location: &[f32; 3], location: &[f32; 3]) -> bool {
        if distance(prev_location, location) < self.min_displacement {
            self.counter = self.counter.saturating_add(1);
        } else {
            self.counter = 0;
        }
        self.counter >= self.window
    }

    pub fn counter(&self) -> u32 {
        self.counter
    }

    pub fn reset(&mut self) {
        self.counter = 0;
    }
}
