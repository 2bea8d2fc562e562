//! Command execution
//!
//! The one place render commands turn into backend calls. Single-threaded
//! rendering and the render thread both go through here, so the two modes
//! draw identically.

use super::{RenderBackend, RenderCommand};
use crate::threading::FrameData;

/// Replay `commands` in order, bracketing runs of sprites in a sprite batch
pub fn execute_commands(commands: &[RenderCommand], backend: &mut dyn RenderBackend) {
    let mut in_batch = false;

    for command in commands {
        if command.is_sprite() != in_batch {
            if in_batch {
                backend.end_sprite_batch();
            } else {
                backend.begin_sprite_batch();
            }
            in_batch = !in_batch;
        }

        match command {
            RenderCommand::ViewProjection(matrix) => backend.set_view_projection(matrix),
            RenderCommand::Sprite(sprite) => backend.draw_sprite(
                &sprite.texture,
                sprite.dest,
                sprite.source,
                sprite.color,
                sprite.rotation,
                sprite.anchor,
            ),
            RenderCommand::FillRect { rect, color } => backend.fill_rect(*rect, *color),
            RenderCommand::StrokeRect { rect, color, width } => backend.draw_rect(*rect, *color, *width),
            RenderCommand::Line { from, to, color, width } => backend.draw_line(*from, *to, *color, *width),
            RenderCommand::Text(text) => backend.draw_text(&text.font, &text.text, text.position, text.color),
        }
    }

    if in_batch {
        backend.end_sprite_batch();
    }
}

/// Execute a whole frame: clear, viewport, view-projection, commands
pub fn execute_frame(frame: &FrameData, backend: &mut dyn RenderBackend) {
    backend.begin_frame(frame.clear_color);
    backend.set_viewport(frame.viewport);
    backend.set_view_projection(&frame.view_projection);
    execute_commands(&frame.render_commands, backend);
    backend.end_frame();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::Texture;
    use crate::foundation::math::{Color, Rect};
    use crate::render::{DrawCall, RecordingBackend, SpriteCommand, Viewport};
    use std::sync::Arc;

    fn sprite() -> RenderCommand {
        let texture = Arc::new(Texture::new("ship", 16, 16));
        RenderCommand::Sprite(SpriteCommand::new(texture, Rect::new(0.0, 0.0, 16.0, 16.0)))
    }

    #[test]
    fn test_sprite_runs_are_batched() {
        let mut backend = RecordingBackend::new();
        let calls = backend.handle();
        let rect = RenderCommand::fill_rect(Rect::new(0.0, 0.0, 1.0, 1.0), Color::RED);

        execute_commands(&[sprite(), sprite(), rect, sprite()], &mut backend);

        let calls = calls.take();
        let shape: Vec<&str> = calls.iter().map(DrawCall::label).collect();
        assert_eq!(
            shape,
            ["begin_batch", "sprite", "sprite", "end_batch", "fill_rect", "begin_batch", "sprite", "end_batch"]
        );
    }

    #[test]
    fn test_frame_is_bracketed() {
        let mut backend = RecordingBackend::new();
        let calls = backend.handle();
        let mut frame = FrameData::default();
        frame.clear_color = Color::BLUE;
        frame.viewport = Viewport::with_size(320, 200);

        execute_frame(&frame, &mut backend);

        let calls = calls.take();
        assert_eq!(calls.first(), Some(&DrawCall::BeginFrame(Color::BLUE)));
        assert_eq!(calls.get(1), Some(&DrawCall::Viewport(Viewport::with_size(320, 200))));
        assert_eq!(calls.last(), Some(&DrawCall::EndFrame));
    }
}
