//! Placing glyphs along a baseline. Screen space is in pixels with y pointing down.
use nalgebra::Point2;

use super::glyph_cache::GlyphRecord;

/// Where one glyph lands on screen.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GlyphQuad {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl GlyphQuad {
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }
}

/// The quad for `glyph` with the pen at `pen`.
///
/// The baseline sits `baseline_offset` pixels below the pen, so glyphs of different heights
/// line up on it rather than on their top edges.
pub fn glyph_quad(
    pen: Point2<f32>,
    glyph: &GlyphRecord,
    scale: f32,
    baseline_offset: f32,
) -> GlyphQuad {
    let size = glyph.size().cast::<f32>();
    let bearing = glyph.bearing().cast::<f32>();
    let width = size.x * scale;
    let height = size.y * scale;

    GlyphQuad {
        x: pen.x + bearing.x * scale,
        y: pen.y + (size.y - bearing.y) * scale + baseline_offset - height,
        width,
        height,
    }
}

/// How far the pen moves after `glyph`, in whole (scaled) pixels.
pub fn advance(glyph: &GlyphRecord, scale: f32) -> f32 {
    // advance is in 1/64 px, >> 6 drops the fraction
    (glyph.advance() >> 6) as f32 * scale
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use nalgebra::point;
    use test_case::test_case;

    use super::*;
    use crate::text::{
        glyph_cache::GlyphCache,
        testing::{FakeFace, FakeGlyph, RecordingBackend},
    };

    fn record(glyph: FakeGlyph) -> GlyphRecord {
        let mut face = FakeFace::new(48).with_glyph('?', glyph);
        let mut backend = RecordingBackend::default();
        let mut cache = GlyphCache::new();
        let record = *cache.get('?', &mut face, &mut backend);
        cache.destroy(&mut backend);
        record
    }

    #[test_case(1.0, 100.0, 200.0, 101.0, 236.0 ; "unscaled")]
    #[test_case(2.0, 100.0, 200.0, 102.0, 224.0 ; "doubled")]
    #[test_case(0.5, 0.0, 0.0, 0.5, 42.0 ; "halved at origin")]
    fn quad_follows_bearing_and_baseline(scale: f32, pen_x: f32, pen_y: f32, x: f32, y: f32) {
        let glyph = record(FakeGlyph::new(10, 12, 1, 12, 11));

        let quad = glyph_quad(point![pen_x, pen_y], &glyph, scale, 48.0);

        assert_relative_eq!(quad.x, x);
        assert_relative_eq!(quad.y, y);
        assert_relative_eq!(quad.width, 10.0 * scale);
        assert_relative_eq!(quad.height, 12.0 * scale);
    }

    #[test]
    fn descender_hangs_below_the_baseline() {
        let glyph = record(FakeGlyph::new(8, 13, 1, 9, 9));

        let quad = glyph_quad(point![0.0, 0.0], &glyph, 1.0, 48.0);

        assert_relative_eq!(quad.y, 39.0);
        assert_relative_eq!(quad.bottom(), 52.0);
    }

    #[test]
    fn glyphs_share_the_baseline() {
        let glyphs = [
            record(FakeGlyph::new(10, 12, 1, 12, 11)),
            record(FakeGlyph::new(8, 13, 1, 9, 9)),
            record(FakeGlyph::new(8, 9, 0, 9, 9)),
            record(FakeGlyph::new(3, 30, 0, 25, 4)),
        ];

        for scale in [0.5, 1.0, 3.0] {
            for glyph in &glyphs {
                let quad = glyph_quad(point![7.0, 20.0], glyph, scale, 48.0);
                let baseline = quad.y + glyph.bearing().y as f32 * scale;
                assert_relative_eq!(baseline, 20.0 + 48.0, epsilon = 1e-4);
            }
        }
    }

    #[test]
    fn same_top_bearing_means_same_top_edge() {
        let short = record(FakeGlyph::new(8, 9, 0, 9, 9));
        let tall = record(FakeGlyph::new(8, 13, 0, 9, 9));

        let short_quad = glyph_quad(point![0.0, 0.0], &short, 1.5, 48.0);
        let tall_quad = glyph_quad(point![0.0, 0.0], &tall, 1.5, 48.0);

        assert_relative_eq!(short_quad.y, tall_quad.y);
        assert!(tall_quad.bottom() > short_quad.bottom());
    }

    #[test]
    fn advance_drops_the_sub_pixel_fraction() {
        let glyph = record(FakeGlyph {
            advance: 11 * 64 + 63,
            ..FakeGlyph::new(10, 12, 1, 12, 0)
        });

        assert_relative_eq!(advance(&glyph, 1.0), 11.0);
        assert_relative_eq!(advance(&glyph, 2.0), 22.0);
    }

    #[test]
    fn empty_record_has_no_extent() {
        let quad = glyph_quad(point![5.0, 5.0], &GlyphRecord::EMPTY, 2.0, 48.0);

        assert_eq!(quad.width, 0.0);
        assert_eq!(quad.height, 0.0);
        assert_eq!(advance(&GlyphRecord::EMPTY, 2.0), 0.0);
    }
}
