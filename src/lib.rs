pub mod bind;
pub mod error;
pub mod pipeline;
pub mod projection;
pub mod redraw;
pub mod render;
pub mod scene;
pub mod text;
pub mod window;

// layering, bottom up:
// - text: fonts, the glyph cache and layout. only talks to the gpu through `GlyphBackend`
// - render: the wgpu side of `GlyphBackend`, one draw call per queued glyph
// - window: winit loop that creates the renderer on the first visible frame and drives an `AppLoop`
//
// the glyph cache must be torn down while the renderer is alive, which is what
// `AppLoop::teardown` is for.

pub use error::TextError;
