use std::collections::HashMap;

/// Hash grid over lon/lat for nearby-point lookups (hover tooltips).
/// Stores indices into an external slice of points.
pub struct SpatialGrid {
    /// Point indices per (cell_x, cell_y)
    cells: HashMap<(i32, i32), Vec<usize>>,
    /// Cell size in degrees
    cell_size: f64,
    len: usize,
}

impl SpatialGrid {
    pub fn new(cell_size: f64) -> Self {
        Self {
            cells: HashMap::new(),
            cell_size,
            len: 0,
        }
    }

    /// Index a sequence of (lon, lat) positions by their order
    pub fn build(positions: impl Iterator<Item = (f64, f64)>, cell_size: f64) -> Self {
        let mut grid = Self::new(cell_size);
        for (idx, (lon, lat)) in positions.enumerate() {
            grid.insert(lon, lat, idx);
        }
        grid
    }

    #[inline(always)]
    fn to_cell(&self, lon: f64, lat: f64) -> (i32, i32) {
        let x = (lon / self.cell_size).floor() as i32;
        let y = (lat / self.cell_size).floor() as i32;
        (x, y)
    }

    pub fn insert(&mut self, lon: f64, lat: f64, idx: usize) {
        let cell = self.to_cell(lon, lat);
        self.cells.entry(cell).or_default().push(idx);
        self.len += 1;
    }

    /// Candidate indices in the square of cells covering `radius_degrees`.
    /// May include points slightly outside the radius.
    pub fn query_radius(&self, lon: f64, lat: f64, radius_degrees: f64) -> Vec<usize> {
        let center = self.to_cell(lon, lat);
        let cell_radius = (radius_degrees / self.cell_size).ceil() as i32;

        let mut results = Vec::new();
        for dy in -cell_radius..=cell_radius {
            for dx in -cell_radius..=cell_radius {
                if let Some(indices) = self.cells.get(&(center.0 + dx, center.1 + dy)) {
                    results.extend_from_slice(indices);
                }
            }
        }
        results
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
