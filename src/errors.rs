//! Error types
//!
//! Shape problems are not Rust errors: they accumulate into an additive
//! [`ErrorCode`] so a caller can tell "drawn approximately" from "nothing
//! drawn". Only caller-input parsing (the thickness token) produces a typed
//! error, carrying a source span for miette diagnostics.

use std::fmt;
use std::ops::{Add, AddAssign};

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

// ============================================================================
// Draw error code
// ============================================================================

/// Additive error code returned by every draw call.
///
/// A value below [`ErrorCode::ZERO_DIMENSION`] still draws; anything at or
/// above it suppresses drawing entirely.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
#[repr(transparent)]
pub struct ErrorCode(pub u32);

impl ErrorCode {
    pub const NONE: ErrorCode = ErrorCode(0);
    /// Thickness reached half of an outer dimension; drawn solid instead.
    pub const THICKNESS_CLAMPED: ErrorCode = ErrorCode(1);
    /// Outer width or height is zero; nothing drawn.
    pub const ZERO_DIMENSION: ErrorCode = ErrorCode(8);
    /// The shape token names no known shape; nothing drawn.
    pub const UNKNOWN_SHAPE: ErrorCode = ErrorCode(128);

    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }

    /// Whether the condition `bit` was recorded
    #[inline]
    pub fn contains(self, bit: ErrorCode) -> bool {
        bit.0 != 0 && self.0 & bit.0 == bit.0
    }

    /// Whether the shape may be drawn (total below 8)
    #[inline]
    pub fn is_drawable(self) -> bool {
        self < ErrorCode::ZERO_DIMENSION
    }
}

impl Add for ErrorCode {
    type Output = ErrorCode;
    fn add(self, rhs: ErrorCode) -> ErrorCode { ErrorCode(self.0 + rhs.0) }
}

impl AddAssign for ErrorCode {
    fn add_assign(&mut self, rhs: ErrorCode) {
        self.0 += rhs.0;
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == 0 {
            return write!(f, "0 (ok)");
        }
        let mut reasons = Vec::new();
        if self.contains(ErrorCode::THICKNESS_CLAMPED) {
            reasons.push("thickness clamped");
        }
        if self.contains(ErrorCode::ZERO_DIMENSION) {
            reasons.push("zero dimension");
        }
        if self.contains(ErrorCode::UNKNOWN_SHAPE) {
            reasons.push("unknown shape");
        }
        write!(f, "{} ({})", self.0, reasons.join(", "))
    }
}

// ============================================================================
// Thickness token errors
// ============================================================================

/// Errors from parsing a `"W/H"` thickness token
#[derive(Error, Diagnostic, Debug)]
pub enum ThicknessError {
    #[error("empty thickness")]
    #[diagnostic(
        code(ellarc::thickness::empty),
        help("use a signed integer like `4` or a `W/H` pair like `4/-2`")
    )]
    Empty,

    #[error("invalid thickness component")]
    #[diagnostic(
        code(ellarc::thickness::invalid),
        help("each component must be a signed integer, e.g. `4/-2`")
    )]
    InvalidComponent {
        #[source_code]
        src: NamedSource<String>,
        #[label("not a signed integer")]
        span: SourceSpan,
    },

    #[error("too many thickness components")]
    #[diagnostic(
        code(ellarc::thickness::too_many_parts),
        help("a thickness is either `T` or `W/H`")
    )]
    TooManyParts {
        #[source_code]
        src: NamedSource<String>,
        #[label("unexpected separator")]
        span: SourceSpan,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_accumulate() {
        let mut code = ErrorCode::NONE;
        code += ErrorCode::THICKNESS_CLAMPED;
        assert!(code.is_drawable());
        code += ErrorCode::ZERO_DIMENSION;
        assert_eq!(code.raw(), 9);
        assert!(!code.is_drawable());
        assert!(code.contains(ErrorCode::THICKNESS_CLAMPED));
        assert!(!code.contains(ErrorCode::UNKNOWN_SHAPE));
    }

    #[test]
    fn display_lists_reasons() {
        let code = ErrorCode::THICKNESS_CLAMPED + ErrorCode::UNKNOWN_SHAPE;
        assert_eq!(code.to_string(), "129 (thickness clamped, unknown shape)");
        assert_eq!(ErrorCode::NONE.to_string(), "0 (ok)");
    }
}
