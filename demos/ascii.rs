//! Render a handful of shapes as ASCII art.
//!
//! Run with `RUST_LOG=ellarc=trace cargo run --example ascii --features tracing`
//! to see per-row spans.

use ellarc::{DrawRequest, Raster, Rgba, draw_shape};
use glam::ivec2;
use tracing_subscriber::EnvFilter;

fn show(title: &str, request: &DrawRequest) {
    let _span = tracing::info_span!("shape", title).entered();
    let mut raster = Raster::new(48, 32);
    let outcome = draw_shape(&mut raster, Rgba::BLACK, request);
    let kind = outcome.kind.map_or_else(|| "?".to_string(), |k| k.to_string());
    tracing::info!(%kind, code = outcome.error.raw(), pixels = outcome.pixels, "rendered");
    println!("{title}: kind={kind} code={} pixels={}", outcome.error, outcome.pixels);

    for y in 0..raster.height() as i32 {
        let row: String = (0..raster.width() as i32)
            .map(|x| if raster.is_painted(ivec2(x, y)) { '#' } else { '.' })
            .collect();
        println!("{row}");
    }
    println!();
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let center = ivec2(24, 16);
    show("circle", &DrawRequest::new(center, 28, 28).shape("circle"));
    show(
        "ring",
        &DrawRequest::new(center, 40, 26).shape("ellipse").thickness(4),
    );
    show(
        "pie",
        &DrawRequest::new(center, 40, 26)
            .angles(30.0, 300.0)
            .shape("pieslice")
            .thickness(3),
    );
    show(
        "rotated chord outline",
        &DrawRequest::new(center, 40, 20)
            .angles(0.0, 200.0)
            .rotation(25.0)
            .shape("chord")
            .thickness(-2),
    );
    show(
        "true chord",
        &DrawRequest::new(center, 36, 28)
            .angles(45.0, 225.0)
            .shape("truechord"),
    );
}
