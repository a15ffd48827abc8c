use nalgebra::{Matrix4, Orthographic3, Point3};

/// Orthographic projection over the viewport in pixels: (0, 0) is the top-left corner and y
/// grows downwards.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScreenProjection {
    pub width: u32,
    pub height: u32,
}

impl ScreenProjection {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn matrix(&self) -> Matrix4<f32> {
        // bottom/top swapped so that y = 0 maps to the top of the screen
        Orthographic3::new(
            0.0,
            self.width.max(1) as f32,
            self.height.max(1) as f32,
            0.0,
            -1.0,
            1.0,
        )
        .into_inner()
    }

    /// Maps a pixel position to normalized device coordinates.
    pub fn to_ndc(&self, x: f32, y: f32) -> Point3<f32> {
        self.matrix().transform_point(&Point3::new(x, y, 0.0))
    }
}
