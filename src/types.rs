//! Strongly-typed primitives for ellarc (zero-cost newtypes).
//!
//! Angles travel through the engine as [`Degrees`] so that the reduction
//! rules live in one place, and the caller-facing wall thickness is a
//! [`Thickness`] pair that knows how to parse the `"W/H"` token form.

use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use std::str::FromStr;

use miette::NamedSource;

use crate::errors::ThicknessError;

const FULL_TURN: f64 = 360.0;

/// An angle in degrees.
///
/// Counter-clockwise from the positive x axis in the engine's y-up frame.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Default)]
#[repr(transparent)]
pub struct Degrees(pub f64);

impl Degrees {
    pub const ZERO: Degrees = Degrees(0.0);
    pub const QUARTER: Degrees = Degrees(90.0);
    pub const HALF: Degrees = Degrees(180.0);
    pub const FULL: Degrees = Degrees(FULL_TURN);

    /// Get the raw value
    #[inline]
    pub fn raw(self) -> f64 {
        self.0
    }

    #[inline]
    pub fn radians(self) -> f64 {
        self.0.to_radians()
    }

    /// Reduce into `[0, 360)` by repeated addition or subtraction of whole
    /// turns.
    ///
    /// Never uses `%`: an angle that is exactly a whole number of turns away
    /// from the target range lands exactly on its representative, with no
    /// truncation artifacts at 0/360. Large inputs are brought down with
    /// doubling steps so the loop stays short. Non-finite input reduces to 0.
    pub fn to_360(self) -> Degrees {
        let mut angle = self.0;
        if !angle.is_finite() {
            return Degrees::ZERO;
        }

        while angle >= FULL_TURN {
            let mut step = FULL_TURN;
            while angle >= step * 2.0 {
                step *= 2.0;
            }
            angle -= step;
        }
        while angle < 0.0 {
            let mut step = FULL_TURN;
            while -angle >= step * 2.0 {
                step *= 2.0;
            }
            angle += step;
        }

        // -1e-20 + 360 rounds to 360
        if angle >= FULL_TURN {
            angle = 0.0;
        }
        Degrees(angle)
    }

    /// True when this is exactly one of 0, 90, 180 or 270 after reduction.
    pub fn is_quadrant(self) -> bool {
        let a = self.to_360().0;
        a == 0.0 || a == 90.0 || a == 180.0 || a == 270.0
    }
}

impl Add for Degrees {
    type Output = Degrees;
    fn add(self, rhs: Degrees) -> Degrees { Degrees(self.0 + rhs.0) }
}
impl Sub for Degrees {
    type Output = Degrees;
    fn sub(self, rhs: Degrees) -> Degrees { Degrees(self.0 - rhs.0) }
}
impl Neg for Degrees {
    type Output = Degrees;
    fn neg(self) -> Degrees { Degrees(-self.0) }
}

impl AddAssign for Degrees {
    fn add_assign(&mut self, rhs: Degrees) {
        self.0 += rhs.0;
    }
}

impl SubAssign for Degrees {
    fn sub_assign(&mut self, rhs: Degrees) {
        self.0 -= rhs.0;
    }
}

impl From<f64> for Degrees {
    fn from(value: f64) -> Self {
        Degrees(value)
    }
}

impl fmt::Display for Degrees {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°", self.0)
    }
}

/// Signed wall thickness as the caller supplies it.
///
/// `0` fills the shape completely, a positive value draws a filled wall of
/// that many pixels, and when both components are negative the wall is
/// drawn as an outline instead.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Thickness {
    pub width: i32,
    pub height: i32,
}

impl Thickness {
    pub const SOLID: Thickness = Thickness { width: 0, height: 0 };

    /// Same thickness along both axes
    pub fn uniform(value: i32) -> Self {
        Self {
            width: value,
            height: value,
        }
    }

    pub fn pair(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Override the height component only
    pub fn with_height(mut self, height: i32) -> Self {
        self.height = height;
        self
    }

    /// Both raw components are negative (the caller asked for an outline).
    pub fn wants_outline(self) -> bool {
        self.width < 0 && self.height < 0
    }
}

impl From<i32> for Thickness {
    fn from(value: i32) -> Self {
        Thickness::uniform(value)
    }
}

impl FromStr for Thickness {
    type Err = ThicknessError;

    /// Parse `"5"`, `"-3"` or `"4/-2"`.
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let named = || NamedSource::new("<thickness>", text.to_string());

        if text.trim().is_empty() {
            return Err(ThicknessError::Empty);
        }

        let mut parts = text.split('/');
        let first = parts.next().unwrap_or_default();
        let second = parts.next();

        if parts.next().is_some() {
            // Point at the second slash
            let offset = text
                .char_indices()
                .filter(|(_, c)| *c == '/')
                .nth(1)
                .map(|(i, _)| i)
                .unwrap_or(0);
            return Err(ThicknessError::TooManyParts {
                src: named(),
                span: (offset, 1).into(),
            });
        }

        let parse_part = |part: &str, offset: usize| -> Result<i32, ThicknessError> {
            part.trim().parse::<i32>().map_err(|_| ThicknessError::InvalidComponent {
                src: named(),
                span: (offset, part.len()).into(),
            })
        };

        let width = parse_part(first, 0)?;
        let height = match second {
            Some(part) => parse_part(part, first.len() + 1)?,
            None => width,
        };

        Ok(Thickness { width, height })
    }
}

impl fmt::Display for Thickness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.width == self.height {
            write!(f, "{}", self.width)
        } else {
            write!(f, "{}/{}", self.width, self.height)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_360_stays_in_range() {
        for raw in [-1080.0, -721.5, -360.0, -0.25, 0.0, 45.0, 359.75, 360.0, 725.0, 1e7] {
            let reduced = Degrees(raw).to_360();
            assert!(
                (0.0..360.0).contains(&reduced.raw()),
                "{raw} reduced to {reduced}"
            );
        }
    }

    #[test]
    fn to_360_is_idempotent() {
        for raw in [-450.0, -90.0, 12.5, 360.0, 540.0, 3601.0] {
            let once = Degrees(raw).to_360();
            assert_eq!(once, once.to_360());
        }
    }

    #[test]
    fn to_360_exact_on_whole_turns() {
        assert_eq!(Degrees(720.0).to_360(), Degrees(0.0));
        assert_eq!(Degrees(-270.0).to_360(), Degrees(90.0));
        assert_eq!(Degrees(-1e-20).to_360(), Degrees(0.0));
        assert_eq!(Degrees(f64::NAN).to_360(), Degrees(0.0));
    }

    #[test]
    fn quadrant_detection() {
        assert!(Degrees(-90.0).is_quadrant());
        assert!(Degrees(450.0).is_quadrant());
        assert!(!Degrees(45.0).is_quadrant());
    }

    #[test]
    fn parse_uniform_thickness() {
        assert_eq!("5".parse::<Thickness>().unwrap(), Thickness::uniform(5));
        assert_eq!(" -3 ".parse::<Thickness>().unwrap(), Thickness::uniform(-3));
    }

    #[test]
    fn parse_pair_thickness() {
        assert_eq!("4/-2".parse::<Thickness>().unwrap(), Thickness::pair(4, -2));
        assert_eq!("-1/-1".parse::<Thickness>().unwrap(), Thickness::uniform(-1));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(matches!(
            "x".parse::<Thickness>(),
            Err(ThicknessError::InvalidComponent { .. })
        ));
        assert!(matches!(
            "1/2/3".parse::<Thickness>(),
            Err(ThicknessError::TooManyParts { .. })
        ));
        assert!(matches!("  ".parse::<Thickness>(), Err(ThicknessError::Empty)));
    }

    #[test]
    fn height_override() {
        let t = Thickness::uniform(-4).with_height(2);
        assert_eq!(t, Thickness::pair(-4, 2));
        assert!(!t.wants_outline());
        assert!(Thickness::uniform(-4).wants_outline());
        assert_eq!(t.to_string(), "-4/2");
    }
}
