use glyph_blit::{scene::TextScene, window::make_window};

fn main() -> anyhow::Result<()> {
    let font_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "./default.ttf".into());

    make_window()
        .with_title("hello text")
        .with_window_size((800, 600))
        .with_animating(true)
        .run(
            TextScene::new(font_path)
                .with_pixel_size(48)
                .with_origin(100.0, 200.0)
                .with_ascii_warmup(true),
        )
}
