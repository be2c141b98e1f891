//! Shared numeric constants for the canvas engine.

// ── Orbit geometry ──────────────────────────────────────────────

/// X coordinate of the fixed orbit center, in world units.
pub const ORBIT_CENTER_X: f64 = 400.0;

/// Y coordinate of the fixed orbit center, in world units.
pub const ORBIT_CENTER_Y: f64 = 300.0;

// ── Physics fallbacks ───────────────────────────────────────────

/// Orbit radius applied when a post record carries none.
pub const DEFAULT_ORBIT_RADIUS: f64 = 150.0;

/// Orbit speed in radians per tick applied when a post record carries none.
pub const DEFAULT_ORBIT_SPEED: f64 = 0.02;

/// Mass applied when a post record carries none. Unused by the closed-form
/// integrator itself; carried for the body mirror.
pub const DEFAULT_MASS: f64 = 1.0;
