use std::fmt;
use std::ops::{Add, Sub};

/// Decimal places kept by the drift-safe helpers. Walk increments such as 0.2
/// must sum to exact integers at tile boundaries.
pub const DRIFT_SAFE_DECIMALS: u32 = 3;

/// A point in grid space, measured in (possibly fractional) tile units.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GridPoint {
    pub x: f64,
    pub y: f64,
}

impl GridPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// The tile this point occupies: nearest integer on both axes, ties away
    /// from zero.
    pub fn occupied_tile(self) -> TileKey {
        TileKey::new(round_to_i32(self.x), round_to_i32(self.y))
    }
}

impl From<TileKey> for GridPoint {
    fn from(key: TileKey) -> Self {
        Self::new(key.x as f64, key.y as f64)
    }
}

/// A point in window pixel space.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

impl PixelPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn offset_y(self, dy: f64) -> Self {
        Self::new(self.x, self.y + dy)
    }
}

impl Add for PixelPoint {
    type Output = PixelPoint;

    fn add(self, rhs: PixelPoint) -> PixelPoint {
        PixelPoint::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for PixelPoint {
    type Output = PixelPoint;

    fn sub(self, rhs: PixelPoint) -> PixelPoint {
        PixelPoint::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Integer tile identity. Tile `(x, y)` covers the unit square centred on
/// `(x, y)` in grid space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileKey {
    pub x: i32,
    pub y: i32,
}

impl TileKey {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Back-to-front comparison: `true` when `self` is drawn before `other`.
    pub fn draws_before(self, other: TileKey) -> bool {
        self.y > other.y || (self.y == other.y && self.x < other.x)
    }
}

impl fmt::Display for TileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Floor that steps away from zero for negative input:
/// `trunc(x) - 1` when `x < 0`, else `trunc(x)`.
pub fn sign_aware_floor(value: f64) -> i32 {
    let truncated = value.trunc() as i32;
    if value < 0.0 {
        truncated.saturating_sub(1)
    } else {
        truncated
    }
}

/// Ceiling counterpart of [`sign_aware_floor`]:
/// `trunc(x)` when `x < 0`, else `trunc(x) + 1`.
pub fn sign_aware_ceiling(value: f64) -> i32 {
    let truncated = value.trunc() as i32;
    if value < 0.0 {
        truncated
    } else {
        truncated.saturating_add(1)
    }
}

/// Rounds to `decimals` places, ties away from zero.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

pub fn precise_add(a: f64, b: f64) -> f64 {
    round_to(a + b, DRIFT_SAFE_DECIMALS)
}

pub fn precise_sub(a: f64, b: f64) -> f64 {
    round_to(a - b, DRIFT_SAFE_DECIMALS)
}

/// Euclidean remainder rounded to the drift-safe precision, so
/// `precise_rem(-0.2, 1.0) == 0.8`.
pub fn precise_rem(a: f64, b: f64) -> f64 {
    round_to(a.rem_euclid(b), DRIFT_SAFE_DECIMALS)
}

fn round_to_i32(value: f64) -> i32 {
    value.round() as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_aware_floor_steps_away_from_zero_for_negatives() {
        assert_eq!(sign_aware_floor(0.2), 0);
        assert_eq!(sign_aware_floor(1.8), 1);
        assert_eq!(sign_aware_floor(-0.2), -1);
        assert_eq!(sign_aware_floor(-1.2), -2);
        assert_eq!(sign_aware_floor(0.0), 0);
    }

    #[test]
    fn sign_aware_ceiling_matches_travel_direction_for_both_signs() {
        assert_eq!(sign_aware_ceiling(0.2), 1);
        assert_eq!(sign_aware_ceiling(0.0), 1);
        assert_eq!(sign_aware_ceiling(-0.8), 0);
        assert_eq!(sign_aware_ceiling(-1.4), -1);
    }

    #[test]
    fn floor_and_ceiling_saturate_at_the_i32_range() {
        assert_eq!(sign_aware_ceiling(1e12), i32::MAX);
        assert_eq!(sign_aware_floor(-1e12), i32::MIN);
        assert_eq!(GridPoint::new(1e12, -1e12).occupied_tile(), TileKey::new(i32::MAX, i32::MIN));
    }

    #[test]
    fn repeated_walk_increments_land_on_integers() {
        let mut x = 0.0;
        for _ in 0..5 {
            x = precise_add(x, 0.2);
        }
        assert_eq!(x, 1.0);

        let mut y = 3.0;
        for _ in 0..50 {
            y = precise_sub(y, 0.2);
        }
        assert_eq!(y, -7.0);
    }

    #[test]
    fn raw_float_addition_would_drift() {
        let mut x = 0.0f64;
        for _ in 0..10 {
            x += 0.1;
        }
        assert_ne!(x, 1.0);
        assert_eq!(round_to(x, DRIFT_SAFE_DECIMALS), 1.0);
    }

    #[test]
    fn precise_rem_is_euclidean() {
        assert_eq!(precise_rem(2.4, 1.0), 0.4);
        assert_eq!(precise_rem(-0.2, 1.0), 0.8);
        assert_eq!(precise_rem(-3.0, 1.0), 0.0);
    }

    #[test]
    fn round_to_breaks_ties_away_from_zero() {
        assert_eq!(round_to(0.5, 0), 1.0);
        assert_eq!(round_to(-0.5, 0), -1.0);
        assert_eq!(round_to(2.345, 1), 2.3);
    }

    #[test]
    fn occupied_tile_rounds_to_nearest() {
        assert_eq!(GridPoint::new(0.4, -0.6).occupied_tile(), TileKey::new(0, -1));
        assert_eq!(GridPoint::new(1.5, -1.5).occupied_tile(), TileKey::new(2, -2));
    }

    #[test]
    fn draws_before_orders_rows_back_to_front() {
        assert!(TileKey::new(5, 2).draws_before(TileKey::new(0, 1)));
        assert!(TileKey::new(0, 1).draws_before(TileKey::new(1, 1)));
        assert!(!TileKey::new(1, 1).draws_before(TileKey::new(0, 1)));
        assert!(!TileKey::new(1, 1).draws_before(TileKey::new(1, 1)));
    }
}
