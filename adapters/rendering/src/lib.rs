#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for crawl adapters.

mod json;
mod text;

use std::time::Duration;

use anyhow::Result as AnyResult;
use crawl_core::{ActorId, ActorKind, CellCoord, Event, Phase, TileKind};
use glam::Vec2;
use serde::Serialize;

pub use json::JsonBackend;
pub use text::TextBackend;

/// Maps board cells onto world-space positions.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct GridProjection {
    /// Number of columns contained in the board.
    pub columns: u32,
    /// Number of rows contained in the board.
    pub rows: u32,
    /// Side length of a single cell expressed in world units.
    pub cell_length: f32,
}

impl GridProjection {
    /// Creates a new projection.
    ///
    /// Returns an error when `cell_length` is not a positive finite number.
    pub fn new(columns: u32, rows: u32, cell_length: f32) -> Result<Self, RenderingError> {
        if !cell_length.is_finite() || cell_length <= 0.0 {
            return Err(RenderingError::InvalidCellLength { cell_length });
        }

        Ok(Self {
            columns,
            rows,
            cell_length,
        })
    }

    /// World-space center of the provided cell.
    #[must_use]
    pub fn coord_to_world(&self, cell: CellCoord) -> Vec2 {
        Vec2::new(
            (cell.column() as f32 + 0.5) * self.cell_length,
            (cell.row() as f32 + 0.5) * self.cell_length,
        )
    }
}

/// Tile layer rebuilt from the world's paint events.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TileCanvas {
    columns: u32,
    rows: u32,
    tiles: Vec<Option<TileKind>>,
}

impl TileCanvas {
    /// Creates a canvas with every tile erased.
    #[must_use]
    pub fn new(columns: u32, rows: u32) -> Self {
        let capacity = usize::try_from(u64::from(columns) * u64::from(rows)).unwrap_or(0);
        Self {
            columns,
            rows,
            tiles: vec![None; capacity],
        }
    }

    /// Applies every `CellPainted` event, ignoring cells outside the canvas.
    pub fn apply(&mut self, events: &[Event]) {
        for event in events {
            if let Event::CellPainted { cell, tile } = event {
                if let Some(slot) = self.index(*cell).and_then(|index| self.tiles.get_mut(index)) {
                    *slot = *tile;
                }
            }
        }
    }

    /// Tile painted onto the cell.
    #[must_use]
    pub fn tile(&self, cell: CellCoord) -> Option<TileKind> {
        self.index(cell)
            .and_then(|index| self.tiles.get(index))
            .copied()
            .flatten()
    }

    /// Provides the dimensions of the canvas.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() < self.columns && cell.row() < self.rows {
            let offset = u64::from(cell.row()) * u64::from(self.columns) + u64::from(cell.column());
            usize::try_from(offset).ok()
        } else {
            None
        }
    }
}

/// Visual representation of an actor.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Sprite {
    /// Actor drawn by the sprite.
    pub actor: ActorId,
    /// Variant of the actor.
    pub kind: ActorKind,
    /// Cell the actor occupies.
    pub cell: CellCoord,
    /// World-space center of the sprite.
    pub position: Vec2,
    /// Whether the actor is animating.
    pub busy: bool,
}

/// Counters shown beside the board.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Hud {
    /// One-based level number.
    pub level: u32,
    /// Food counter.
    pub food: i32,
    /// Turn counter of the current phase.
    pub turn: u64,
    /// Phase currently running.
    pub phase: Option<Phase>,
    /// Whether food ran out.
    pub game_over: bool,
}

/// Scene description combining the tile layer, sprites and counters.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Scene {
    /// Projection used to place sprites.
    pub projection: GridProjection,
    /// Painted tiles.
    pub canvas: TileCanvas,
    /// Actors drawn above the tiles, in drawing order.
    pub sprites: Vec<Sprite>,
    /// Counters shown beside the board.
    pub hud: Hud,
}

impl Scene {
    /// Creates an empty scene for a board of the projection's dimensions.
    #[must_use]
    pub fn new(projection: GridProjection) -> Self {
        Self {
            canvas: TileCanvas::new(projection.columns, projection.rows),
            projection,
            sprites: Vec::new(),
            hud: Hud::default(),
        }
    }

    /// Sprite drawn on top of the provided cell, if any.
    #[must_use]
    pub fn sprite_at(&self, cell: CellCoord) -> Option<&Sprite> {
        self.sprites.iter().rev().find(|sprite| sprite.cell == cell)
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title printed before the first frame.
    pub title: String,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(title: T, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            title: title.into(),
            scene,
        }
    }
}

/// Whether the frame loop keeps running after the current frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameControl {
    /// Render the frame and continue.
    Continue,
    /// Render the frame and stop.
    Exit,
}

/// Rendering backend capable of presenting crawl scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the simulated frame delta
    /// and mutates the scene before it is rendered, allowing adapters to step
    /// the simulation deterministically.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, &mut Scene) -> AnyResult<FrameControl>;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Clone, Copy, Debug, PartialEq, thiserror::Error)]
pub enum RenderingError {
    /// Cell length must be positive to avoid a degenerate projection.
    #[error("cell_length must be positive and finite (received {cell_length})")]
    InvalidCellLength {
        /// Provided length that failed validation.
        cell_length: f32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn projection_rejects_non_positive_cell_length() {
        assert_eq!(
            GridProjection::new(4, 4, 0.0),
            Err(RenderingError::InvalidCellLength { cell_length: 0.0 })
        );
        assert!(GridProjection::new(4, 4, f32::NAN).is_err());
    }

    #[test]
    fn coord_to_world_returns_cell_centers() {
        let projection = GridProjection::new(10, 8, 32.0).expect("valid projection");
        assert_eq!(
            projection.coord_to_world(CellCoord::new(0, 0)),
            Vec2::new(16.0, 16.0)
        );
        assert_eq!(
            projection.coord_to_world(CellCoord::new(3, 2)),
            Vec2::new(112.0, 80.0)
        );
    }

    #[test]
    fn canvas_tracks_paint_and_erase_events() {
        let mut canvas = TileCanvas::new(3, 3);
        let cell = CellCoord::new(1, 2);
        canvas.apply(&[
            Event::CellPainted {
                cell,
                tile: Some(TileKind::Wall { tier: 2 }),
            },
            Event::CellPainted {
                cell: CellCoord::new(7, 7),
                tile: Some(TileKind::Ground),
            },
            Event::BoardCleared,
        ]);
        assert_eq!(canvas.tile(cell), Some(TileKind::Wall { tier: 2 }));
        assert_eq!(canvas.tile(CellCoord::new(7, 7)), None);

        canvas.apply(&[Event::CellPainted { cell, tile: None }]);
        assert_eq!(canvas.tile(cell), None);
    }
}
