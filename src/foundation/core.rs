use std::fmt;

use crate::foundation::error::{ScriptError, ScriptResult};

pub use kurbo::{BezPath, Point, Vec2};

/// Prefix used by front-end-generated anonymous entity ids.
///
/// User identifiers come from the language grammar and can never start with
/// `@`, so the injection pass can tell synthetic ids apart from variable
/// references without a heuristic.
pub const SYNTHETIC_PREFIX: &str = "@";

/// A name in the program.
///
/// Equality is by name. An `Ident` doubles as the stable id of the entity a
/// definition binds, so repeated references to one name converge on one
/// scene-graph node.
#[derive(
    Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct Ident(pub String);

impl Ident {
    /// An identifier from a user-visible name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// An anonymous id for an entity the user never named.
    pub fn synthetic(tag: impl fmt::Display) -> Self {
        Self(format!("{SYNTHETIC_PREFIX}{tag}"))
    }

    /// Whether this id was generated rather than written by the user.
    pub fn is_synthetic(&self) -> bool {
        self.0.starts_with(SYNTHETIC_PREFIX)
    }

    /// The name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Ident {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Position of a statement in a program.
///
/// After the injection pass this is the sole ordering key: contiguous,
/// 0-based, unique within the program.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct StatementIndex(pub u32);

impl fmt::Display for StatementIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Sweep endpoints of exactly zero are nudged to this value to avoid
/// degenerate plots.
pub const SWEEP_EPSILON: f64 = 0.001;

/// A numeric sweep domain `(from, to)`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SweepRange {
    /// Inclusive start of the sweep.
    pub from: f64,
    /// Inclusive end of the sweep.
    pub to: f64,
}

impl SweepRange {
    /// Build a sweep range, rejecting non-finite endpoints.
    pub fn new(from: f64, to: f64) -> ScriptResult<Self> {
        if !from.is_finite() || !to.is_finite() {
            return Err(ScriptError::structure("sweep endpoints must be finite"));
        }
        Ok(Self { from, to })
    }

    /// The same range with zero endpoints nudged to [`SWEEP_EPSILON`].
    pub fn nudged(self) -> Self {
        fn avoid_zero(v: f64) -> f64 {
            if v == 0.0 { SWEEP_EPSILON } else { v }
        }
        Self {
            from: avoid_zero(self.from),
            to: avoid_zero(self.to),
        }
    }

    /// Signed width of the range.
    pub fn span(self) -> f64 {
        self.to - self.from
    }

    /// Smallest range covering both `self` and `other`.
    pub fn union(self, other: Self) -> Self {
        Self {
            from: self.from.min(other.from),
            to: self.to.max(other.to),
        }
    }

    /// Midpoint of the range.
    pub fn center(self) -> f64 {
        (self.from + self.to) / 2.0
    }
}

/// Placement of an entity relative to an anchor entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Direction {
    /// To the left of the anchor.
    Left,
    /// To the right of the anchor.
    Right,
    /// Above the anchor.
    Above,
    /// Below the anchor.
    Below,
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
