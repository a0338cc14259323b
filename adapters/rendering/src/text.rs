//! Plain-text backend that prints the board as a character grid.

use std::{io::Write, time::Duration};

use anyhow::{Context, Result as AnyResult};
use crawl_core::{ActorKind, CellCoord, TileKind};

use crate::{FrameControl, Presentation, RenderingBackend, Scene};

/// Backend that writes a character grid whenever the scene changes.
#[derive(Debug)]
pub struct TextBackend<W> {
    out: W,
    frame_dt: Duration,
    max_frames: u64,
}

impl<W: Write> TextBackend<W> {
    /// Creates a backend stepping `frame_dt` per frame for at most `max_frames` frames.
    pub fn new(out: W, frame_dt: Duration, max_frames: u64) -> Self {
        Self {
            out,
            frame_dt,
            max_frames,
        }
    }

    /// Renders the scene into rows of characters followed by a status line.
    #[must_use]
    pub fn render(scene: &Scene) -> String {
        let (columns, rows) = scene.canvas.dimensions();
        let mut text = String::new();
        for row in 0..rows {
            for column in 0..columns {
                let cell = CellCoord::new(column, row);
                let glyph = match scene.sprite_at(cell) {
                    Some(sprite) => sprite_glyph(sprite.kind),
                    None => tile_glyph(scene.canvas.tile(cell)),
                };
                text.push(glyph);
            }
            text.push('\n');
        }

        let hud = &scene.hud;
        let phase = hud
            .phase
            .map_or_else(|| "-".to_owned(), |phase| format!("{phase:?}"));
        text.push_str(&format!(
            "level {}  food {}  turn {}  phase {}",
            hud.level, hud.food, hud.turn, phase
        ));
        if hud.game_over {
            text.push_str("  GAME OVER");
        }
        text.push('\n');
        text
    }
}

impl<W: Write> RenderingBackend for TextBackend<W> {
    fn run<F>(mut self, presentation: Presentation, mut update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, &mut Scene) -> AnyResult<FrameControl>,
    {
        let Presentation { title, mut scene } = presentation;
        writeln!(self.out, "{title}").context("failed to write title")?;

        let mut last_frame: Option<String> = None;
        for frame in 0..self.max_frames {
            let control = update_scene(self.frame_dt, &mut scene)?;
            let rendered = Self::render(&scene);
            if last_frame.as_deref() != Some(rendered.as_str()) {
                writeln!(self.out, "-- frame {frame} --")
                    .and_then(|()| self.out.write_all(rendered.as_bytes()))
                    .with_context(|| format!("failed to write frame {frame}"))?;
                last_frame = Some(rendered);
            }
            if control == FrameControl::Exit {
                break;
            }
        }

        self.out.flush().context("failed to flush text output")
    }
}

fn sprite_glyph(kind: ActorKind) -> char {
    match kind {
        ActorKind::Player => '@',
        ActorKind::Enemy => 'e',
        ActorKind::Food => 'f',
        ActorKind::Wall => 'W',
        ActorKind::Exit => 'E',
    }
}

fn tile_glyph(tile: Option<TileKind>) -> char {
    match tile {
        None => ' ',
        Some(TileKind::Ground) => '.',
        Some(TileKind::Border) => '#',
        Some(TileKind::Exit) => 'E',
        Some(TileKind::Wall { tier }) => char::from_digit(tier.min(9), 10).unwrap_or('W'),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GridProjection, Sprite};
    use crawl_core::{ActorId, Event, Phase};
    use glam::Vec2;

    fn scene() -> Scene {
        let mut scene = Scene::new(GridProjection::new(3, 3, 1.0).expect("valid projection"));
        let mut events = Vec::new();
        for row in 0..3 {
            for column in 0..3 {
                let cell = CellCoord::new(column, row);
                let tile = if cell == CellCoord::new(1, 1) {
                    TileKind::Ground
                } else {
                    TileKind::Border
                };
                events.push(Event::CellPainted {
                    cell,
                    tile: Some(tile),
                });
            }
        }
        scene.canvas.apply(&events);
        scene
    }

    #[test]
    fn renders_tiles_sprites_and_status() {
        let mut scene = scene();
        scene.sprites.push(Sprite {
            actor: ActorId::PLAYER,
            kind: ActorKind::Player,
            cell: CellCoord::new(1, 1),
            position: Vec2::ZERO,
            busy: false,
        });
        scene.hud.level = 2;
        scene.hud.food = 40;
        scene.hud.turn = 5;
        scene.hud.phase = Some(Phase::Player);

        assert_eq!(
            TextBackend::<Vec<u8>>::render(&scene),
            "###\n#@#\n###\nlevel 2  food 40  turn 5  phase Player\n"
        );
    }

    #[test]
    fn run_skips_unchanged_frames_and_stops_on_exit() {
        let mut buffer = Vec::new();
        let backend = TextBackend::new(&mut buffer, Duration::from_millis(10), 10);
        let mut calls = 0;
        backend
            .run(Presentation::new("crawl", scene()), |_, scene| {
                calls += 1;
                if calls == 3 {
                    scene.hud.game_over = true;
                    return Ok(FrameControl::Exit);
                }
                Ok(FrameControl::Continue)
            })
            .expect("writing to a vector succeeds");

        let output = String::from_utf8(buffer).expect("utf-8 output");
        assert_eq!(calls, 3);
        assert!(output.starts_with("crawl\n-- frame 0 --\n"));
        assert!(!output.contains("-- frame 1 --"));
        assert!(output.contains("-- frame 2 --"));
        assert!(output.trim_end().ends_with("GAME OVER"));
    }
}
