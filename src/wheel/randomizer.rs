//! Rotation generation and angle-to-segment mapping.
//!
//! Everything here is a pure function of its inputs plus a [`RandomSource`],
//! so the engine and the tests can drive it with scripted randomness.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Lower bound of the rotation used when normal generation fails.
pub const FALLBACK_ROTATION_MIN: f64 = 1800.0;
/// Upper bound (exclusive) of the fallback rotation.
pub const FALLBACK_ROTATION_MAX: f64 = 3600.0;

/// Error type for rotation and selection.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum SelectionError {
    /// There are no segments to select from.
    #[error("Cannot select from an empty catalog")]
    EmptyCatalog,
    /// The random source produced a rotation that is NaN or infinite.
    #[error("Generated rotation is not finite")]
    NonFiniteRotation,
    /// The final angle handed to selection is NaN or infinite.
    #[error("Final angle {0} is not finite")]
    NonFiniteAngle(f64),
}

/// Source of uniform numbers in `[0, 1)`.
pub trait RandomSource: Send {
    /// Next uniform sample. Implementations may misbehave; callers check.
    fn next_unit(&mut self) -> f64;
}

/// Default random source backed by `StdRng`.
#[derive(Debug, Clone)]
pub struct SeededRandom {
    rng: StdRng,
}

impl SeededRandom {
    /// Seed from the operating system.
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Deterministic source for reproducible runs.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Seeded when `seed` is given, otherwise from entropy.
    pub fn new(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::from_entropy, Self::from_seed)
    }
}

impl RandomSource for SeededRandom {
    fn next_unit(&mut self) -> f64 {
        self.rng.random::<f64>()
    }
}

/// Generate a spin rotation in degrees.
///
/// The result is `full_rotations * 360 + final_offset` with
/// `full_rotations` uniform in `[min_rotations, max_rotations)` and
/// `final_offset` uniform in `[0, 360)`.
pub fn generate_rotation(
    rng: &mut dyn RandomSource,
    min_rotations: f64,
    max_rotations: f64,
) -> Result<f64, SelectionError> {
    let full_rotations = min_rotations + rng.next_unit() * (max_rotations - min_rotations);
    let final_offset = rng.next_unit() * 360.0;
    let rotation = full_rotations * 360.0 + final_offset;
    if rotation.is_finite() {
        Ok(rotation)
    } else {
        Err(SelectionError::NonFiniteRotation)
    }
}

/// Rotation drawn from `[FALLBACK_ROTATION_MIN, FALLBACK_ROTATION_MAX)`.
pub fn fallback_rotation(rng: &mut dyn RandomSource) -> Result<f64, SelectionError> {
    let rotation =
        FALLBACK_ROTATION_MIN + rng.next_unit() * (FALLBACK_ROTATION_MAX - FALLBACK_ROTATION_MIN);
    if rotation.is_finite() {
        Ok(rotation)
    } else {
        Err(SelectionError::NonFiniteRotation)
    }
}

/// Map a resting angle to the segment under the pointer.
///
/// The pointer sits at the top of the wheel. Segment `i` is drawn rotated by
/// `i * segment` degrees and centred on its own angle, so the angle is
/// shifted by half a segment before flooring:
///
/// ```text
/// normalized = angle mod 360
/// adjusted   = (360 - normalized + segment / 2) mod 360
/// index      = floor(adjusted / segment)
/// ```
pub fn select_index(final_angle: f64, item_count: usize) -> Result<usize, SelectionError> {
    if item_count == 0 {
        return Err(SelectionError::EmptyCatalog);
    }
    if !final_angle.is_finite() {
        return Err(SelectionError::NonFiniteAngle(final_angle));
    }

    let segment = 360.0 / item_count as f64;
    let normalized = final_angle.rem_euclid(360.0);
    let adjusted = (360.0 - normalized + segment / 2.0).rem_euclid(360.0);
    let index = (adjusted / segment).floor() as usize;
    Ok(index.min(item_count - 1))
}

/// Uniformly pick a segment index without going through the wheel geometry.
///
/// Returns `None` only for an empty catalog; a misbehaving random source
/// degrades to index 0.
pub fn fallback_index(rng: &mut dyn RandomSource, item_count: usize) -> Option<usize> {
    if item_count == 0 {
        return None;
    }
    let sample = rng.next_unit();
    if !(0.0..1.0).contains(&sample) {
        return Some(0);
    }
    Some(((sample * item_count as f64).floor() as usize).min(item_count - 1))
}

/// Normalize an angle into `[0, 360)`.
pub fn normalize_angle(angle: f64) -> f64 {
    let normalized = angle.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if normalized >= 360.0 {
        0.0
    } else {
        normalized
    }
}
