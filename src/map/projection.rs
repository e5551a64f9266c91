use std::f64::consts::PI;

const MIN_ZOOM: f64 = 0.5;
const MAX_ZOOM: f64 = 100.0;
const ZOOM_STEP: f64 = 1.5;

/// Visible map area in Web Mercator, measured in braille dots
#[derive(Clone, Debug)]
pub struct Viewport {
    /// Center longitude (-180 to 180)
    pub center_lon: f64,
    /// Center latitude (-85 to 85)
    pub center_lat: f64,
    /// Zoom level (higher = more zoomed in)
    pub zoom: f64,
    /// Canvas dot width
    pub width: usize,
    /// Canvas dot height
    pub height: usize,
}

/// Normalised Mercator y in [0, 1] for a latitude in degrees
#[inline(always)]
fn mercator_y(lat: f64) -> f64 {
    let lat_rad = lat.clamp(-85.0, 85.0).to_radians();
    (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0
}

impl Viewport {
    pub fn new(center_lon: f64, center_lat: f64, zoom: f64, width: usize, height: usize) -> Self {
        Self {
            center_lon,
            center_lat,
            zoom,
            width,
            height,
        }
    }

    /// Whole-world view
    pub fn world(width: usize, height: usize) -> Self {
        Self::new(0.0, 20.0, 1.0, width, height)
    }

    /// Copy of this viewport resized to a canvas of `cols` x `rows` characters
    pub fn sized_for(&self, cols: u16, rows: u16) -> Self {
        Self {
            width: cols as usize * 2,
            height: rows as usize * 4,
            ..self.clone()
        }
    }

    /// Degrees of longitude covered by one dot
    pub fn degrees_per_pixel(&self) -> f64 {
        360.0 / (self.zoom * self.width.max(1) as f64)
    }

    /// Pan by a dot delta
    pub fn pan(&mut self, dx: i32, dy: i32) {
        let scale = self.degrees_per_pixel();
        self.center_lon += dx as f64 * scale;
        self.center_lat -= dy as f64 * scale * 0.5;

        if self.center_lon > 180.0 {
            self.center_lon -= 360.0;
        } else if self.center_lon < -180.0 {
            self.center_lon += 360.0;
        }

        self.center_lat = self.center_lat.clamp(-85.0, 85.0);
    }

    pub fn zoom_in(&mut self) {
        self.zoom = (self.zoom * ZOOM_STEP).min(MAX_ZOOM);
    }

    pub fn zoom_out(&mut self) {
        self.zoom = (self.zoom / ZOOM_STEP).max(MIN_ZOOM);
    }

    /// Zoom in keeping the point under (px, py) fixed
    pub fn zoom_in_at(&mut self, px: i32, py: i32) {
        self.zoom_at(px, py, ZOOM_STEP);
    }

    /// Zoom out keeping the point under (px, py) fixed
    pub fn zoom_out_at(&mut self, px: i32, py: i32) {
        self.zoom_at(px, py, 1.0 / ZOOM_STEP);
    }

    fn zoom_at(&mut self, px: i32, py: i32, factor: f64) {
        let (lon, lat) = self.unproject(px, py);
        self.zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);

        // Pan so the anchored point lands back under the cursor
        let (new_px, new_py) = self.project(lon, lat);
        self.pan(new_px - px, new_py - py);
    }

    /// Dot coordinates back to (lon, lat)
    pub fn unproject(&self, px: i32, py: i32) -> (f64, f64) {
        let scale = self.zoom * self.width as f64;
        let center_x = (self.center_lon + 180.0) / 360.0;
        let center_y = mercator_y(self.center_lat);

        let x = (px as f64 - self.width as f64 / 2.0) / scale + center_x;
        let y = (py as f64 - self.height as f64 / 2.0) / scale + center_y;

        let lon = x * 360.0 - 180.0;
        let lat = (PI * (1.0 - 2.0 * y)).sinh().atan().to_degrees();

        (lon, lat)
    }

    /// (lon, lat) to dot coordinates
    pub fn project(&self, lon: f64, lat: f64) -> (i32, i32) {
        let x = (lon + 180.0) / 360.0;
        let y = mercator_y(lat);

        let center_x = (self.center_lon + 180.0) / 360.0;
        let center_y = mercator_y(self.center_lat);

        let scale = self.zoom * self.width as f64;

        let px = ((x - center_x) * scale + self.width as f64 / 2.0) as i32;
        let py = ((y - center_y) * scale + self.height as f64 / 2.0) as i32;

        (px, py)
    }

    /// Strictly inside the canvas
    pub fn contains(&self, px: i32, py: i32) -> bool {
        px >= 0 && py >= 0 && (px as usize) < self.width && (py as usize) < self.height
    }

    /// Rough bounding-box check for a segment
    pub fn line_might_be_visible(&self, p1: (i32, i32), p2: (i32, i32)) -> bool {
        let min_x = p1.0.min(p2.0);
        let max_x = p1.0.max(p2.0);
        let min_y = p1.1.min(p2.1);
        let max_y = p1.1.max(p2.1);

        max_x >= 0 && min_x < self.width as i32 && max_y >= 0 && min_y < self.height as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_center() {
        let vp = Viewport::new(0.0, 0.0, 1.0, 100, 100);
        assert_eq!(vp.project(0.0, 0.0), (50, 50));
    }

    #[test]
    fn test_unproject_inverts_project() {
        let vp = Viewport::new(30.0, 10.0, 4.0, 200, 120);
        let (px, py) = vp.project(35.0, 12.0);
        let (lon, lat) = vp.unproject(px, py);
        assert!((lon - 35.0).abs() < 0.5);
        assert!((lat - 12.0).abs() < 0.5);
    }

    #[test]
    fn test_pan() {
        let mut vp = Viewport::new(0.0, 0.0, 1.0, 100, 100);
        vp.pan(10, 0);
        assert!(vp.center_lon > 0.0);
        vp.pan(0, -10_000);
        assert_eq!(vp.center_lat, 85.0);
    }

    #[test]
    fn test_zoom_clamped() {
        let mut vp = Viewport::world(100, 100);
        for _ in 0..50 {
            vp.zoom_out();
        }
        assert_eq!(vp.zoom, MIN_ZOOM);
        for _ in 0..50 {
            vp.zoom_in();
        }
        assert_eq!(vp.zoom, MAX_ZOOM);
    }

    #[test]
    fn test_zoom_at_keeps_anchor() {
        let mut vp = Viewport::new(0.0, 0.0, 2.0, 200, 200);
        let before = vp.unproject(150, 100);
        vp.zoom_in_at(150, 100);
        let after = vp.unproject(150, 100);
        assert!((before.0 - after.0).abs() < 1.0);
        assert!((before.1 - after.1).abs() < 1.0);
    }
}
