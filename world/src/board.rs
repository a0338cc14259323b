//! Dense cell grid tracking passability, occupancy and painted tiles.

use crawl_core::{ActorId, BoardView, CellCoord, CellState, Event, TileKind};
use rand::Rng;

/// Reasons an occupant transfer may fail. Board state is unchanged on error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    /// One of the endpoints lies outside the board.
    #[error("cell {0:?} lies outside the board")]
    OutOfBounds(CellCoord),
    /// The source cell holds nothing to move.
    #[error("cell {0:?} has no occupant to move")]
    Vacant(CellCoord),
    /// The destination cell can never be stood on.
    #[error("cell {0:?} is impassable")]
    Impassable(CellCoord),
    /// The destination cell already holds an occupant.
    #[error("cell {0:?} is already occupied")]
    Occupied(CellCoord),
}

/// Reasons an actor cannot be placed onto a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PlacementError {
    /// The cell lies outside the board.
    #[error("cell {0:?} lies outside the board")]
    OutOfBounds(CellCoord),
    /// The cell can never be stood on.
    #[error("cell {0:?} is impassable")]
    Impassable(CellCoord),
    /// The cell already holds an occupant.
    #[error("cell {0:?} is already occupied")]
    Occupied(CellCoord),
}

/// Rectangular grid of cells plus the pool of cells free for placement.
#[derive(Clone, Debug)]
pub struct Board {
    columns: u32,
    rows: u32,
    cells: Vec<CellState>,
    empty_cells: Vec<CellCoord>,
}

impl Board {
    /// Creates a board whose cells are all impassable and unpainted.
    #[must_use]
    pub fn new(columns: u32, rows: u32) -> Self {
        let capacity_u64 = u64::from(columns) * u64::from(rows);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        Self {
            columns,
            rows,
            cells: vec![CellState::default(); capacity],
            empty_cells: Vec::new(),
        }
    }

    /// Number of columns, border included.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows, border included.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Captures a read-only view of every cell.
    #[must_use]
    pub fn view(&self) -> BoardView<'_> {
        BoardView::new(&self.cells, self.columns, self.rows)
    }

    /// Reports whether the cell lies inside the outermost ring.
    #[must_use]
    pub fn is_border(&self, cell: CellCoord) -> bool {
        cell.column() == 0
            || cell.row() == 0
            || cell.column() + 1 == self.columns
            || cell.row() + 1 == self.rows
    }

    /// False for out-of-bounds or impassable cells.
    #[must_use]
    pub fn is_passable(&self, cell: CellCoord) -> bool {
        self.view().is_passable(cell)
    }

    /// Passable and unoccupied.
    #[must_use]
    pub fn is_empty(&self, cell: CellCoord) -> bool {
        self.view().is_empty(cell)
    }

    /// Actor placed on the cell, if any.
    #[must_use]
    pub fn occupant_at(&self, cell: CellCoord) -> Option<ActorId> {
        self.view().occupant(cell)
    }

    /// Tile currently painted onto the cell.
    #[must_use]
    pub fn tile_at(&self, cell: CellCoord) -> Option<TileKind> {
        self.view().cell(cell).and_then(|state| state.tile)
    }

    /// Cells still available for random placement.
    #[must_use]
    pub fn empty_cells(&self) -> &[CellCoord] {
        &self.empty_cells
    }

    /// Lays out the border ring and the interior and rebuilds the empty-cell set.
    ///
    /// `reserved` cells stay out of the empty-cell set even though they are
    /// passable.
    pub fn lay_out(&mut self, reserved: &[CellCoord], out_events: &mut Vec<Event>) {
        self.empty_cells.clear();
        for row in 0..self.rows {
            for column in 0..self.columns {
                let cell = CellCoord::new(column, row);
                let border = self.is_border(cell);
                let Some(index) = self.index(cell) else {
                    continue;
                };
                self.cells[index] = CellState {
                    passable: !border,
                    occupant: None,
                    tile: None,
                };

                let tile = if border {
                    TileKind::Border
                } else {
                    TileKind::Ground
                };
                self.paint(cell, Some(tile), out_events);

                if !border && !reserved.contains(&cell) {
                    self.empty_cells.push(cell);
                }
            }
        }
    }

    /// Removes the cell from the empty-cell set, reporting whether it was present.
    pub fn reserve(&mut self, cell: CellCoord) -> bool {
        match self.empty_cells.iter().position(|candidate| *candidate == cell) {
            Some(position) => {
                let _ = self.empty_cells.swap_remove(position);
                true
            }
            None => false,
        }
    }

    /// Samples a cell from the empty-cell set without replacement.
    pub fn take_random_empty<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<CellCoord> {
        if self.empty_cells.is_empty() {
            return None;
        }
        let index = rng.gen_range(0..self.empty_cells.len());
        Some(self.empty_cells.swap_remove(index))
    }

    /// Places an actor onto a passable, unoccupied cell.
    pub fn place(&mut self, cell: CellCoord, actor: ActorId) -> Result<(), PlacementError> {
        let index = self
            .index(cell)
            .ok_or(PlacementError::OutOfBounds(cell))?;
        let state = &mut self.cells[index];
        if !state.passable {
            return Err(PlacementError::Impassable(cell));
        }
        if state.occupant.is_some() {
            return Err(PlacementError::Occupied(cell));
        }
        state.occupant = Some(actor);
        let _ = self.reserve(cell);
        Ok(())
    }

    /// Transfers the occupant of `from` onto `to`.
    ///
    /// Vacated cells do not rejoin the empty-cell set.
    pub fn move_occupant(&mut self, from: CellCoord, to: CellCoord) -> Result<(), MoveError> {
        let source = self.index(from).ok_or(MoveError::OutOfBounds(from))?;
        let destination = self.index(to).ok_or(MoveError::OutOfBounds(to))?;
        if source == destination {
            return Ok(());
        }

        let Some(actor) = self.cells[source].occupant else {
            return Err(MoveError::Vacant(from));
        };
        let target = &mut self.cells[destination];
        if !target.passable {
            return Err(MoveError::Impassable(to));
        }
        if target.occupant.is_some() {
            return Err(MoveError::Occupied(to));
        }

        target.occupant = Some(actor);
        self.cells[source].occupant = None;
        Ok(())
    }

    /// Removes and returns the occupant of the cell.
    pub fn remove_occupant(&mut self, cell: CellCoord) -> Option<ActorId> {
        let index = self.index(cell)?;
        self.cells[index].occupant.take()
    }

    /// Records a tile for presentation and reports the change.
    pub fn paint(&mut self, cell: CellCoord, tile: Option<TileKind>, out_events: &mut Vec<Event>) {
        let Some(index) = self.index(cell) else {
            return;
        };
        self.cells[index].tile = tile;
        out_events.push(Event::CellPainted { cell, tile });
    }

    /// Resets every cell to impassable, empty and unpainted.
    ///
    /// Returns the occupants that were removed so the owner can destroy them.
    pub fn clear(&mut self, out_events: &mut Vec<Event>) -> Vec<ActorId> {
        self.empty_cells.clear();
        let mut occupants = Vec::new();
        for row in 0..self.rows {
            for column in 0..self.columns {
                let cell = CellCoord::new(column, row);
                let Some(index) = self.index(cell) else {
                    continue;
                };
                let state = std::mem::take(&mut self.cells[index]);
                if let Some(actor) = state.occupant {
                    occupants.push(actor);
                }
                if state.tile.is_some() {
                    out_events.push(Event::CellPainted { cell, tile: None });
                }
            }
        }
        occupants
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() < self.columns && cell.row() < self.rows {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}
