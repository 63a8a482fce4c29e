//! Distance metrics over descriptor vectors.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// How many terms the halting kernel accumulates between threshold checks.
const HALT_STRIDE: usize = 8;

/// A distance metric over equal-length `f32` descriptors.
///
/// The metric is chosen once at index creation and carried by the
/// [`Index`](crate::Index), so indices with different metrics can coexist in
/// one process. The numeric codes accepted by [`Metric::from_code`] are the
/// ones exposed at the benchmark boundary: `0` for Euclidean, `1` for
/// angular, `2` for Euclidean with early halting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Metric {
    /// Squared Euclidean distance, `Σ(aᵢ − bᵢ)²`. Left un-rooted because
    /// only the ordering of distances matters and the square root is
    /// monotone.
    Euclidean,
    /// The angle between the two vectors in radians:
    /// `arccos(a·b / (‖a‖·‖b‖))`, in `[0, π]`.
    Angular,
    /// Same value as [`Metric::Euclidean`], but the accumulation stops as
    /// soon as the partial sum exceeds the caller's threshold.
    EuclideanEarlyHalt,
}

impl Default for Metric {
    fn default() -> Self {
        Self::Euclidean
    }
}

impl Metric {
    /// Resolves a numeric metric code from the external boundary.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidInput`] if the code is not 0, 1, or 2.
    pub fn from_code(code: u32) -> Result<Self> {
        match code {
            0 => Ok(Self::Euclidean),
            1 => Ok(Self::Angular),
            2 => Ok(Self::EuclideanEarlyHalt),
            _ => Err(Error::invalid_input(format!("unknown metric code {code}"))),
        }
    }

    /// The numeric code of this metric at the external boundary.
    #[must_use]
    pub const fn code(self) -> u32 {
        match self {
            Self::Euclidean => 0,
            Self::Angular => 1,
            Self::EuclideanEarlyHalt => 2,
        }
    }

    /// The name of the metric.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Euclidean => "euclidean",
            Self::Angular => "angular",
            Self::EuclideanEarlyHalt => "euclidean-early-halt",
        }
    }

    /// The distance between `x` and `y` without a halting threshold.
    #[must_use]
    pub fn one_to_one(self, x: &[f32], y: &[f32]) -> f32 {
        self.distance(x, y, f32::INFINITY)
    }

    /// The distance between `x` and `y`, given the caller's current best
    /// distance as a halting threshold.
    ///
    /// The threshold contract: when the true distance is below `threshold`
    /// the returned value is exact; otherwise the returned value is some
    /// value at or above `threshold`. Every "is this closer than the current
    /// best" comparison is therefore unaffected by halting.
    pub(crate) fn distance(self, x: &[f32], y: &[f32], threshold: f32) -> f32 {
        match self {
            Self::Euclidean => distances::vectors::euclidean_sq(x, y),
            Self::Angular => angular(x, y),
            Self::EuclideanEarlyHalt => euclidean_sq_halting(x, y, threshold),
        }
    }
}

/// The angle between two vectors in radians.
///
/// The cosine is clamped to `[-1, 1]` before `acos` so accumulated rounding
/// cannot push it out of domain. A zero-norm vector is treated as orthogonal
/// to everything.
fn angular(x: &[f32], y: &[f32]) -> f32 {
    let [xx, yy, xy] = x
        .iter()
        .zip(y.iter())
        .fold([0.0_f32; 3], |[xx, yy, xy], (&a, &b)| {
            [a.mul_add(a, xx), b.mul_add(b, yy), a.mul_add(b, xy)]
        });

    let norms = (xx * yy).sqrt();
    if norms <= f32::EPSILON {
        return std::f32::consts::FRAC_PI_2;
    }

    libm::acosf((xy / norms).clamp(-1.0, 1.0))
}

/// Squared Euclidean distance with early halting.
///
/// Accumulates in strides of [`HALT_STRIDE`] terms and stops once the
/// partial sum strictly exceeds `threshold`. The accumulation order matches
/// the plain kernel, so a returned value at or below the threshold is the
/// exact distance.
fn euclidean_sq_halting(x: &[f32], y: &[f32], threshold: f32) -> f32 {
    let mut sum = 0.0_f32;
    for (xc, yc) in x.chunks(HALT_STRIDE).zip(y.chunks(HALT_STRIDE)) {
        for (&a, &b) in xc.iter().zip(yc.iter()) {
            let d = a - b;
            sum += d * d;
        }
        if sum > threshold {
            return sum;
        }
    }
    sum
}
