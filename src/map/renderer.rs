use crate::aggregate::MapPoint;
use crate::braille::BrailleCanvas;
use crate::map::geometry::{draw_circle, draw_line};
use crate::map::projection::Viewport;

/// A geographic line (sequence of lon/lat coordinates)
pub type LineString = Vec<(f64, f64)>;

/// Level of detail for backdrop data
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lod {
    Low,    // 110m - world view
    Medium, // 50m - continental
    High,   // 10m - regional
}

impl Lod {
    pub fn from_zoom(zoom: f64) -> Self {
        if zoom < 2.0 {
            Lod::Low
        } else if zoom < 8.0 {
            Lod::Medium
        } else {
            Lod::High
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Lod::Low => "110m",
            Lod::Medium => "50m",
            Lod::High => "10m",
        }
    }
}

/// One frame of map output: backdrop canvases plus one canvas per colour group
pub struct MapLayers {
    pub coastlines: BrailleCanvas,
    pub borders: BrailleCanvas,
    pub events: Vec<BrailleCanvas>,
}

/// Backdrop line data at several resolutions, plus event point drawing
#[derive(Default)]
pub struct MapRenderer {
    coastlines_low: Vec<LineString>,
    coastlines_medium: Vec<LineString>,
    coastlines_high: Vec<LineString>,
    borders_medium: Vec<LineString>,
    borders_high: Vec<LineString>,
    pub show_borders: bool,
}

impl MapRenderer {
    pub fn new() -> Self {
        Self {
            show_borders: true,
            ..Self::default()
        }
    }

    /// Best available coastlines at or below the requested detail
    fn coastlines(&self, lod: Lod) -> &[LineString] {
        let tiers = [&self.coastlines_high, &self.coastlines_medium, &self.coastlines_low];
        let skip = match lod {
            Lod::High => 0,
            Lod::Medium => 1,
            Lod::Low => 2,
        };
        tiers
            .into_iter()
            .skip(skip)
            .find(|lines| !lines.is_empty())
            .map_or(&[][..], |lines| lines.as_slice())
    }

    fn borders(&self, lod: Lod) -> &[LineString] {
        match lod {
            Lod::High if !self.borders_high.is_empty() => &self.borders_high,
            _ => &self.borders_medium,
        }
    }

    /// Draw backdrop and event points. `group_of` maps a point to its colour
    /// group in `0..groups`.
    pub fn render<F>(
        &self,
        cols: usize,
        rows: usize,
        viewport: &Viewport,
        points: &[MapPoint],
        groups: usize,
        group_of: F,
    ) -> MapLayers
    where
        F: Fn(&MapPoint) -> usize,
    {
        let lod = Lod::from_zoom(viewport.zoom);

        let mut coastlines = BrailleCanvas::new(cols, rows);
        for line in self.coastlines(lod) {
            draw_linestring(&mut coastlines, line, viewport);
        }

        let mut borders = BrailleCanvas::new(cols, rows);
        if self.show_borders {
            for line in self.borders(lod) {
                draw_linestring(&mut borders, line, viewport);
            }
        }

        let mut events: Vec<BrailleCanvas> =
            (0..groups.max(1)).map(|_| BrailleCanvas::new(cols, rows)).collect();
        let radius = marker_radius(viewport.zoom);
        for point in points {
            let (px, py) = viewport.project(point.lon, point.lat);
            if viewport.contains(px, py) {
                let group = group_of(point).min(events.len() - 1);
                draw_circle(&mut events[group], px, py, radius);
            }
        }

        MapLayers {
            coastlines,
            borders,
            events,
        }
    }

    pub fn add_coastline(&mut self, line: LineString, lod: Lod) {
        match lod {
            Lod::Low => self.coastlines_low.push(line),
            Lod::Medium => self.coastlines_medium.push(line),
            Lod::High => self.coastlines_high.push(line),
        }
    }

    /// Low detail borders share the medium tier
    pub fn add_border(&mut self, line: LineString, lod: Lod) {
        match lod {
            Lod::High => self.borders_high.push(line),
            Lod::Low | Lod::Medium => self.borders_medium.push(line),
        }
    }

    pub fn has_data(&self) -> bool {
        !self.coastlines_low.is_empty()
            || !self.coastlines_medium.is_empty()
            || !self.coastlines_high.is_empty()
    }

    pub fn toggle_borders(&mut self) {
        self.show_borders = !self.show_borders;
    }
}

/// Marker size grows as the map zooms in
fn marker_radius(zoom: f64) -> i32 {
    if zoom > 10.0 {
        2
    } else if zoom > 4.0 {
        1
    } else {
        0
    }
}

/// Draw a linestring, skipping segments that wrap the antimeridian or fall off-canvas
fn draw_linestring(canvas: &mut BrailleCanvas, line: &LineString, viewport: &Viewport) {
    if line.len() < 2 {
        return;
    }

    let mut prev: Option<(i32, i32)> = None;
    for &(lon, lat) in line {
        let (px, py) = viewport.project(lon, lat);

        if let Some((prev_x, prev_y)) = prev {
            let dist = ((px - prev_x).abs() + (py - prev_y).abs()) as usize;
            if dist < viewport.width && viewport.line_might_be_visible((prev_x, prev_y), (px, py)) {
                draw_line(canvas, prev_x, prev_y, px, py);
            }
        }

        prev = Some((px, py));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(lon: f64, lat: f64, trigger: &str) -> MapPoint {
        MapPoint {
            lat,
            lon,
            title: "t".into(),
            country: None,
            trigger: Some(trigger.into()),
            fatalities: 0,
        }
    }

    #[test]
    fn test_coastline_fallback() {
        let mut r = MapRenderer::new();
        assert!(!r.has_data());
        r.add_coastline(vec![(0.0, 0.0), (1.0, 1.0)], Lod::Low);
        assert!(r.has_data());
        assert_eq!(r.coastlines(Lod::High).len(), 1);

        r.add_coastline(vec![(0.0, 0.0), (2.0, 2.0)], Lod::Medium);
        r.add_coastline(vec![(0.0, 0.0), (3.0, 3.0)], Lod::Medium);
        assert_eq!(r.coastlines(Lod::High).len(), 2);
        assert_eq!(r.coastlines(Lod::Low).len(), 1);
    }

    #[test]
    fn test_points_land_in_their_group() {
        let r = MapRenderer::new();
        let vp = Viewport::world(80, 40);
        let points = vec![point(0.0, 0.0, "rain"), point(90.0, 10.0, "flood")];
        let layers = r.render(40, 10, &vp, &points, 2, |p| {
            usize::from(p.trigger.as_deref() == Some("flood"))
        });

        assert_eq!(layers.events.len(), 2);
        assert_eq!(layers.events[0].glyphs().count(), 1);
        assert_eq!(layers.events[1].glyphs().count(), 1);
        assert_eq!(layers.coastlines.glyphs().count(), 0);
    }

    #[test]
    fn test_offscreen_points_skipped() {
        let r = MapRenderer::new();
        let vp = Viewport::new(0.0, 0.0, 20.0, 80, 40);
        let layers = r.render(40, 10, &vp, &[point(120.0, 40.0, "rain")], 1, |_| 0);
        assert_eq!(layers.events[0].glyphs().count(), 0);
    }
}
