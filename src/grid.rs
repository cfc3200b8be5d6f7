use serde::{Deserialize, Serialize};
use crate::data::MapSize;
use crate::entity::{EnemyId, GridPosition};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

/// Maps grid cells to and from presentation space. The map is centered in the viewport.
#[derive(Clone, Debug)]
pub struct GridSystem {
    cell_size: f64,
    viewport_width: f64,
    viewport_height: f64,
    map_size: MapSize,
}

impl GridSystem {
    pub fn new(cell_size: f64, viewport_width: f64, viewport_height: f64, map_size: MapSize) -> Self {
        Self {
            cell_size,
            viewport_width,
            viewport_height,
            map_size,
        }
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    pub fn map_size(&self) -> MapSize {
        self.map_size
    }

    pub fn set_viewport(&mut self, width: f64, height: f64) {
        self.viewport_width = width;
        self.viewport_height = height;
    }

    /// Top-left corner of the grid in pixels.
    pub fn origin(&self) -> PixelPoint {
        PixelPoint {
            x: (self.viewport_width - self.map_size.width as f64 * self.cell_size) / 2.0,
            y: (self.viewport_height - self.map_size.height as f64 * self.cell_size) / 2.0,
        }
    }

    pub fn contains(&self, pos: GridPosition) -> bool {
        pos.x >= 0 && pos.x < self.map_size.width && pos.y >= 0 && pos.y < self.map_size.height
    }

    /// Cell under a pointer, or `None` outside the map.
    pub fn pointer_to_cell(&self, x: f64, y: f64) -> Option<GridPosition> {
        let origin = self.origin();
        let gx = ((x - origin.x) / self.cell_size).floor();
        let gy = ((y - origin.y) / self.cell_size).floor();
        if !gx.is_finite() || !gy.is_finite() {
            return None;
        }

        let pos = GridPosition::new(gx as i32, gy as i32);
        self.contains(pos).then_some(pos)
    }

    /// Pixel center of a cell.
    pub fn cell_to_pixel(&self, pos: GridPosition) -> PixelPoint {
        let origin = self.origin();
        PixelPoint {
            x: origin.x + pos.x as f64 * self.cell_size + self.cell_size / 2.0,
            y: origin.y + pos.y as f64 * self.cell_size + self.cell_size / 2.0,
        }
    }

    /// Every cell of the map, row by row.
    pub fn cells(&self) -> impl Iterator<Item = GridPosition> {
        let MapSize { width, height } = self.map_size;
        (0..height).flat_map(move |y| (0..width).map(move |x| GridPosition::new(x, y)))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellKind {
    Move,
    Attack,
    RangedTarget,
    SelfTarget,
}

impl CellKind {
    pub fn color(self) -> u32 {
        match self {
            CellKind::Move => 0x00FF00,
            CellKind::Attack => 0xFF0000,
            CellKind::RangedTarget => 0xFF6600,
            CellKind::SelfTarget => 0x00FFFF,
        }
    }
}

/// What a highlighted cell does when clicked.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CellAction {
    MoveTo { position: GridPosition },
    BasicAttack { target: EnemyId },
    UseSkill { skill: usize, target: Option<EnemyId> },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HighlightCell {
    pub position: GridPosition,
    pub kind: CellKind,
    pub action: CellAction,
}

/// Tracked set of interactive cells.
///
/// Every repopulation must start with `clear`, so stale cells never outlive a redraw.
#[derive(Debug, Default)]
pub struct CellLayer {
    cells: Vec<HighlightCell>,
    created: u64,
    destroyed: u64,
}

impl CellLayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.destroyed += self.cells.len() as u64;
        self.cells.clear();
    }

    pub fn create_cell(&mut self, position: GridPosition, kind: CellKind, action: CellAction) {
        self.created += 1;
        self.cells.push(HighlightCell { position, kind, action });
    }

    pub fn action_at(&self, position: GridPosition) -> Option<CellAction> {
        self.cells.iter().find(|c| c.position == position).map(|c| c.action)
    }

    pub fn cells(&self) -> &[HighlightCell] {
        &self.cells
    }

    #[cfg(test)]
    pub fn positions(&self) -> Vec<GridPosition> {
        self.cells.iter().map(|c| c.position).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Cells created and not yet torn down.
    pub fn live_count(&self) -> u64 {
        self.created - self.destroyed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> GridSystem {
        GridSystem::new(60.0, 800.0, 600.0, MapSize { width: 6, height: 6 })
    }

    #[test]
    fn origin_centers_the_map() {
        let origin = grid().origin();
        assert_eq!(origin, PixelPoint { x: 220.0, y: 120.0 });
    }

    #[test]
    fn pointer_maps_to_cell() {
        let grid = grid();
        assert_eq!(grid.pointer_to_cell(220.0, 120.0), Some(GridPosition::new(0, 0)));
        assert_eq!(grid.pointer_to_cell(339.9, 179.0), Some(GridPosition::new(1, 0)));
        assert_eq!(grid.pointer_to_cell(579.0, 479.0), Some(GridPosition::new(5, 5)));
    }

    #[test]
    fn pointer_outside_map_is_none() {
        let grid = grid();
        assert_eq!(grid.pointer_to_cell(219.0, 200.0), None);
        assert_eq!(grid.pointer_to_cell(580.0, 200.0), None);
        assert_eq!(grid.pointer_to_cell(300.0, 480.0), None);
        assert_eq!(grid.pointer_to_cell(f64::NAN, 0.0), None);
    }

    #[test]
    fn cell_center_round_trips_through_pointer() {
        let grid = grid();
        for pos in grid.cells() {
            let center = grid.cell_to_pixel(pos);
            assert_eq!(grid.pointer_to_cell(center.x, center.y), Some(pos));
        }
        assert_eq!(grid.cells().count(), 36);
    }

    #[test]
    fn clear_tears_down_every_cell() {
        let mut layer = CellLayer::new();
        let pos = GridPosition::new(1, 1);
        layer.create_cell(pos, CellKind::Move, CellAction::MoveTo { position: pos });
        layer.create_cell(GridPosition::new(2, 1), CellKind::Attack, CellAction::BasicAttack { target: EnemyId(3) });
        assert_eq!(layer.live_count(), 2);
        assert_eq!(layer.action_at(pos), Some(CellAction::MoveTo { position: pos }));

        layer.clear();
        assert_eq!(layer.live_count(), 0);
        assert!(layer.is_empty());
        assert_eq!(layer.action_at(pos), None);
    }
}
