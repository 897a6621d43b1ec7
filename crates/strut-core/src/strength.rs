//! Constraint strengths.
//!
//! A strength packs three priority bands into a single scalar so that
//! strengths compare with plain numeric ordering. Each band is clipped to
//! `[0, 1000]` before it is combined, so a heavy weak band never carries
//! into the medium band.

use std::fmt;

/// Upper bound of a single strength band.
const BAND_MAX: f64 = 1000.0;

/// The priority of a constraint.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Strength(f64);

impl Strength {
    /// Constraints that must be satisfied exactly.
    pub const REQUIRED: Strength = Strength(1_001_001_000.0);
    pub const STRONG: Strength = Strength(1_000_000.0);
    pub const MEDIUM: Strength = Strength(1_000.0);
    pub const WEAK: Strength = Strength(1.0);

    /// Create a strength from its strong, medium and weak bands.
    pub fn new(strong: f64, medium: f64, weak: f64) -> Self {
        Self::create(strong, medium, weak, 1.0)
    }

    /// Create a strength from three bands scaled by a common weight.
    pub fn create(strong: f64, medium: f64, weak: f64, weight: f64) -> Self {
        let band = |v: f64| (v * weight).clamp(0.0, BAND_MAX);
        Strength(band(strong) * 1_000_000.0 + band(medium) * 1_000.0 + band(weak))
    }

    /// Clamp the strength into `[0, REQUIRED]`.
    pub fn clip(self) -> Self {
        Strength(self.0.clamp(0.0, Self::REQUIRED.0))
    }

    /// Check if this is a required strength.
    pub fn is_required(&self) -> bool {
        self.0 >= Self::REQUIRED.0
    }

    /// The raw scalar used as an objective weight.
    pub fn value(&self) -> f64 {
        self.0
    }
}

impl From<f64> for Strength {
    fn from(value: f64) -> Self {
        Strength(value)
    }
}

impl From<Strength> for f64 {
    fn from(strength: Strength) -> Self {
        strength.0
    }
}

impl fmt::Display for Strength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::REQUIRED {
            write!(f, "required")
        } else if *self == Self::STRONG {
            write!(f, "strong")
        } else if *self == Self::MEDIUM {
            write!(f, "medium")
        } else if *self == Self::WEAK {
            write!(f, "weak")
        } else {
            write!(f, "{}", self.0)
        }
    }
}
