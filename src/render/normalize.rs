//! Shape normalizer: request → canonical [`ShapeDescriptor`]

use crate::errors::ErrorCode;
use crate::log;
use crate::types::Degrees;

use super::DrawRequest;
use super::types::{Modifiers, ShapeDescriptor, ShapeKind};

/// Modifier substrings, in the order they are stripped
const MODIFIER_TOKENS: [&str; 5] = ["trim", "smooth", "flipv", "fliph", "comp"];

/// Map a base shape name (modifiers already stripped) to its kind
pub fn kind_for_name(name: &str) -> Option<ShapeKind> {
    let kind = match name {
        "arc" => ShapeKind::Arc,
        "arcchord" | "arcc" | "chord" => ShapeKind::Chord,
        "arcsegment" | "arcs" | "pie" | "pieslice" | "segment" => ShapeKind::Segment,
        "arctruechord" | "arct" | "arctchord" | "tchord" | "truechord" => ShapeKind::TrueChord,
        "circle" => ShapeKind::Circle,
        "ellipse" => ShapeKind::Ellipse,
        _ => return None,
    };
    Some(kind)
}

/// Strip every modifier substring from a lowercase token.
///
/// A flag is set only when its substring occurred an odd number of times.
pub fn strip_modifiers(token: &str) -> (String, Modifiers) {
    let mut name = token.to_lowercase();
    let mut modifiers = Modifiers::default();

    for modifier in MODIFIER_TOKENS {
        let odd = name.matches(modifier).count() % 2 == 1;
        name = name.replace(modifier, "");
        match modifier {
            "trim" => modifiers.trim = odd,
            "smooth" => modifiers.smooth = odd,
            "flipv" => modifiers.flip_v = odd,
            "fliph" => modifiers.flip_h = odd,
            _ => modifiers.complement = odd,
        }
    }

    (name, modifiers)
}

/// Canonicalize a draw request.
///
/// Returns `Err` with the accumulated code when the shape token is not
/// recognized; every other problem is recorded in the descriptor's `error`
/// field.
pub fn normalize(request: &DrawRequest) -> Result<ShapeDescriptor, ErrorCode> {
    let mut error = ErrorCode::NONE;

    let mut width = request.width.unsigned_abs();
    let mut height = request.height.unsigned_abs();
    if width == 0 || height == 0 {
        error += ErrorCode::ZERO_DIMENSION;
    }

    let (base, modifiers) = strip_modifiers(&request.shape);
    let Some(mut kind) = kind_for_name(&base) else {
        error += ErrorCode::UNKNOWN_SHAPE;
        log::warn!(token = %request.shape, code = error.raw(), "unrecognized shape token");
        return Err(error);
    };

    let outline_requested = request.thickness.wants_outline();
    let mut thickness_x = request.thickness.width.unsigned_abs();
    let mut thickness_y = request.thickness.height.unsigned_abs();

    // Reduce the raw angles before anything else so a whole-turn sweep is
    // recognized however it was written.
    let mut start = request.start.to_360();
    let mut end = request.end.to_360();
    if end <= start {
        end += Degrees::FULL;
    }
    let full_sweep = kind.is_closed() || end - start >= Degrees::FULL;
    if kind.is_closed() {
        start = Degrees::ZERO;
        end = Degrees::FULL;
    }

    if kind == ShapeKind::Arc && full_sweep {
        kind = ShapeKind::Ellipse;
    }
    if kind.is_closed() {
        kind = if width == height { ShapeKind::Circle } else { ShapeKind::Ellipse };
    }

    let mut rotation = request.rotation;
    let mut radii_swapped = false;
    if height > width {
        std::mem::swap(&mut width, &mut height);
        std::mem::swap(&mut thickness_x, &mut thickness_y);
        rotation += Degrees::QUARTER;
        start -= Degrees::QUARTER;
        end -= Degrees::QUARTER;
        radii_swapped = true;
    }

    if error.is_drawable()
        && (thickness_x.saturating_mul(2) >= width || thickness_y.saturating_mul(2) >= height)
    {
        log::warn!(
            thickness_x,
            thickness_y,
            width,
            height,
            "thickness reaches half the shape; drawing solid"
        );
        error += ErrorCode::THICKNESS_CLAMPED;
        thickness_x = 0;
        thickness_y = 0;
    }

    let filled = !(outline_requested && (thickness_x > 0 || thickness_y > 0));

    if modifiers.complement && !full_sweep {
        let (s, e) = (start, end);
        start = e;
        end = s + Degrees::FULL;
    }
    if modifiers.flip_v {
        let (s, e) = (start, end);
        start = -e;
        end = -s;
        rotation = -rotation;
    }
    if modifiers.flip_h {
        let (s, e) = (start, end);
        start = Degrees::HALF - e;
        end = Degrees::HALF - s;
        rotation = -rotation;
    }

    let start_360 = start.to_360();
    let end = if full_sweep {
        start_360 + Degrees::FULL
    } else {
        let mut e = end.to_360();
        if e <= start_360 {
            e += Degrees::FULL;
        }
        e
    };

    let descriptor = ShapeDescriptor {
        kind,
        width,
        height,
        start: start_360,
        end,
        rotation: rotation.to_360(),
        thickness_x,
        thickness_y,
        filled,
        modifiers,
        radii_swapped,
        error,
    };

    log::debug!(
        kind = %descriptor.kind,
        width = descriptor.width,
        height = descriptor.height,
        start = descriptor.start.raw(),
        end = descriptor.end.raw(),
        rotation = descriptor.rotation.raw(),
        filled = descriptor.filled,
        code = descriptor.error.raw(),
        "normalized shape"
    );

    Ok(descriptor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Thickness;
    use glam::ivec2;

    fn request(shape: &str) -> DrawRequest {
        DrawRequest::new(ivec2(100, 100), 40, 20).angles(0.0, 90.0).shape(shape)
    }

    fn describe(token: &str) -> String {
        match normalize(&request(token)) {
            Ok(desc) => format!("{token} => {} [{}]", desc.kind, desc.modifiers),
            Err(code) => format!("{token} => error {code}"),
        }
    }

    #[test]
    fn alias_and_modifier_table() {
        let tokens = [
            "arc",
            "pieslice",
            "arctruechordfliph",
            "chordcompcomp",
            "ArcTChordTrimSmooth",
            "circleflipvfliph",
            "segmentcomp",
            "arcs",
            "arcc",
            "banana",
        ];
        let table: Vec<String> = tokens.iter().map(|t| describe(t)).collect();
        insta::assert_snapshot!(table.join("\n"), @r"
        arc => arc [-]
        pieslice => segment [-]
        arctruechordfliph => truechord [fliph]
        chordcompcomp => chord [-]
        ArcTChordTrimSmooth => truechord [trim+smooth]
        circleflipvfliph => ellipse [flipv+fliph]
        segmentcomp => segment [comp]
        arcs => segment [-]
        arcc => chord [-]
        banana => error 128 (unknown shape)
        ");
    }

    #[test]
    fn full_sweep_arc_becomes_circle() {
        let req = DrawRequest::new(ivec2(0, 0), 40, 40).angles(0.0, 360.0).shape("arc");
        let desc = normalize(&req).unwrap();
        assert_eq!(desc.kind, ShapeKind::Circle);
        assert!(desc.is_full_sweep());

        let req = DrawRequest::new(ivec2(0, 0), 40, 30).angles(15.0, 15.0).shape("arc");
        assert_eq!(normalize(&req).unwrap().kind, ShapeKind::Ellipse);
    }

    #[test]
    fn circle_and_full_ellipse_share_geometry() {
        let circle = normalize(&DrawRequest::new(ivec2(0, 0), 40, 40).shape("circle")).unwrap();
        let ellipse = normalize(
            &DrawRequest::new(ivec2(0, 0), 40, 40)
                .angles(0.0, 360.0)
                .shape("ellipse"),
        )
        .unwrap();
        assert_eq!(circle.semi_axes(), ellipse.semi_axes());
        assert_eq!((circle.start, circle.end), (ellipse.start, ellipse.end));
        assert_eq!(circle.rotation, ellipse.rotation);
    }

    #[test]
    fn tall_shapes_are_turned_on_their_side() {
        let req = DrawRequest::new(ivec2(0, 0), 10, 30)
            .angles(0.0, 90.0)
            .shape("arc")
            .thickness(Thickness::pair(2, 3));
        let desc = normalize(&req).unwrap();
        assert!(desc.radii_swapped);
        assert_eq!((desc.width, desc.height), (30, 10));
        assert_eq!((desc.thickness_x, desc.thickness_y), (3, 2));
        assert_eq!(desc.rotation, Degrees(90.0));
        assert_eq!((desc.start, desc.end), (Degrees(270.0), Degrees(360.0)));
    }

    #[test]
    fn oversized_thickness_is_clamped() {
        let req = request("arc").thickness(10);
        let desc = normalize(&req).unwrap();
        assert_eq!(desc.error, ErrorCode::THICKNESS_CLAMPED);
        assert_eq!((desc.thickness_x, desc.thickness_y), (0, 0));
        assert!(desc.filled);

        // Negative (outline) thickness that gets clamped falls back to a fill
        let desc = normalize(&request("arc").thickness(-12)).unwrap();
        assert!(desc.filled);
        assert!(desc.error.contains(ErrorCode::THICKNESS_CLAMPED));
    }

    #[test]
    fn outline_needs_both_components_negative() {
        assert!(!normalize(&request("arc").thickness(-2)).unwrap().filled);
        assert!(normalize(&request("arc").thickness(Thickness::pair(-2, 2))).unwrap().filled);
        assert!(normalize(&request("arc").thickness(2)).unwrap().filled);
    }

    #[test]
    fn zero_dimension_is_reported() {
        let req = DrawRequest::new(ivec2(0, 0), 0, 20).shape("circle");
        let desc = normalize(&req).unwrap();
        assert!(!desc.error.is_drawable());
        assert!(desc.error.contains(ErrorCode::ZERO_DIMENSION));

        let req = DrawRequest::new(ivec2(0, 0), 0, 20).shape("blob");
        assert_eq!(normalize(&req).unwrap_err().raw(), 136);
    }

    #[test]
    fn complement_takes_the_other_side() {
        let desc = normalize(&request("arccomp")).unwrap();
        assert_eq!((desc.start, desc.end), (Degrees(90.0), Degrees(360.0)));
    }

    #[test]
    fn mirrors_reflect_angles_and_rotation() {
        let req = DrawRequest::new(ivec2(0, 0), 40, 20)
            .angles(30.0, 100.0)
            .rotation(20.0)
            .shape("arcflipv");
        let desc = normalize(&req).unwrap();
        assert_eq!((desc.start, desc.end), (Degrees(260.0), Degrees(330.0)));
        assert_eq!(desc.rotation, Degrees(340.0));

        let req = DrawRequest::new(ivec2(0, 0), 40, 20)
            .angles(30.0, 100.0)
            .shape("arcfliph");
        let desc = normalize(&req).unwrap();
        assert_eq!((desc.start, desc.end), (Degrees(80.0), Degrees(150.0)));
    }

    #[test]
    fn double_mirror_cancels() {
        let plain = normalize(&request("arc")).unwrap();
        let doubled = normalize(&request("arcflipvflipv")).unwrap();
        assert_eq!(plain, doubled);
    }

    #[test]
    fn end_is_forced_past_start() {
        let req = DrawRequest::new(ivec2(0, 0), 40, 20).angles(300.0, 30.0).shape("arc");
        let desc = normalize(&req).unwrap();
        assert_eq!((desc.start, desc.end), (Degrees(300.0), Degrees(390.0)));
    }
}
