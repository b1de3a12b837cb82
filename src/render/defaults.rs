//! Tuned tolerances and step sizes.
//!
//! The distance and ellipse-equation tolerances were tuned by eye against
//! rendered output, not derived. Keep them as they are.

/// Slopes steeper than this are treated as vertical.
pub const SLOPE_LIMIT: f64 = 10_000.0;

/// A chord sample closer than this (in pixels) to the inner boundary counts
/// as touching it.
pub const CLOSE_APPROACH: f64 = 2.0;

/// Crossing points further apart than this mean the chord really cuts the
/// inner boundary rather than grazing it.
pub const CROSSING_GAP: f64 = 2.0;

/// Ellipse equation values inside `[ELLIPSE_NEAR_LOW, ELLIPSE_NEAR_HIGH]`
/// are treated as lying on the boundary.
pub const ELLIPSE_NEAR_LOW: f64 = 0.95;
pub const ELLIPSE_NEAR_HIGH: f64 = 1.05;

/// Absorbs trig round-off before a value is floored onto the pixel lattice.
pub const SNAP_EPSILON: f64 = 1e-9;

/// Angular step of the outline walk, in degrees.
pub const ANGLE_STEP: f64 = 1.0;

/// Number of inner-boundary samples taken by the true-chord resolver.
pub const CHORD_SAMPLES: usize = 360;

/// A true chord sweeping more than this leaves a pinch against the inner
/// boundary when it is tangential, which gets stitched.
pub const WIDE_SWEEP: f64 = 180.0;
