//! Map backdrop loading: Natural Earth GeoJSON coastlines and borders.

use crate::map::{Lod, MapRenderer};
use anyhow::{Context, Result};
use geojson::{GeoJson, Geometry, Value};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

const COASTLINE_FILES: [(&str, Lod); 3] = [
    ("ne_110m_coastline.json", Lod::Low),
    ("ne_50m_coastline.json", Lod::Medium),
    ("ne_10m_coastline.json", Lod::High),
];

const BORDER_FILES: [(&str, Lod); 2] = [
    ("ne_50m_borders.json", Lod::Medium),
    ("ne_10m_borders.json", Lod::High),
];

/// Load every backdrop file present in `data_dir`. Unreadable files are
/// logged and skipped.
pub fn load_backdrop(renderer: &mut MapRenderer, data_dir: &Path) {
    for (filename, lod) in COASTLINE_FILES {
        let path = data_dir.join(filename);
        if path.exists() {
            match read_lines(&path) {
                Ok(lines) => {
                    debug!(file = filename, lines = lines.len(), "loaded coastlines");
                    lines.into_iter().for_each(|l| renderer.add_coastline(l, lod));
                }
                Err(e) => warn!(file = filename, "skipping coastlines: {e:#}"),
            }
        }
    }

    for (filename, lod) in BORDER_FILES {
        let path = data_dir.join(filename);
        if path.exists() {
            match read_lines(&path) {
                Ok(lines) => {
                    debug!(file = filename, lines = lines.len(), "loaded borders");
                    lines.into_iter().for_each(|l| renderer.add_border(l, lod));
                }
                Err(e) => warn!(file = filename, "skipping borders: {e:#}"),
            }
        }
    }

    if !renderer.has_data() {
        debug!(dir = %data_dir.display(), "no backdrop data found, using built-in outline");
        add_simple_world(renderer);
    }
}

/// Parse a GeoJSON file into lon/lat polylines
fn read_lines(path: &Path) -> Result<Vec<Vec<(f64, f64)>>> {
    let mut bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let geojson: GeoJson = simd_json::serde::from_slice(&mut bytes)
        .with_context(|| format!("parsing {}", path.display()))?;

    let mut lines = Vec::new();
    collect_lines(&geojson, &mut |line| lines.push(line));
    Ok(lines)
}

fn collect_lines<F>(geojson: &GeoJson, add_line: &mut F)
where
    F: FnMut(Vec<(f64, f64)>),
{
    match geojson {
        GeoJson::FeatureCollection(fc) => {
            for geometry in fc.features.iter().filter_map(|f| f.geometry.as_ref()) {
                geometry_lines(geometry, add_line);
            }
        }
        GeoJson::Feature(f) => {
            if let Some(geometry) = &f.geometry {
                geometry_lines(geometry, add_line);
            }
        }
        GeoJson::Geometry(geometry) => geometry_lines(geometry, add_line),
    }
}

fn geometry_lines<F>(geometry: &Geometry, add_line: &mut F)
where
    F: FnMut(Vec<(f64, f64)>),
{
    // Positions with fewer than two ordinates are skipped
    let to_line = |coords: &Vec<Vec<f64>>| -> Vec<(f64, f64)> {
        coords
            .iter()
            .filter_map(|c| match c.get(0..2) {
                Some(&[lon, lat]) => Some((lon, lat)),
                _ => None,
            })
            .collect()
    };

    match &geometry.value {
        Value::LineString(coords) => add_line(to_line(coords)),
        Value::MultiLineString(lines) => lines.iter().for_each(|l| add_line(to_line(l))),
        // Polygons contribute their exterior ring only
        Value::Polygon(rings) => {
            if let Some(exterior) = rings.first() {
                add_line(to_line(exterior));
            }
        }
        Value::MultiPolygon(polygons) => {
            for exterior in polygons.iter().filter_map(|rings| rings.first()) {
                add_line(to_line(exterior));
            }
        }
        Value::GeometryCollection(geometries) => {
            for g in geometries {
                geometry_lines(g, add_line);
            }
        }
        _ => {}
    }
}

/// Coarse continent outlines used when no GeoJSON is available
const SIMPLE_CONTINENTS: [&[(f64, f64)]; 6] = [
    // North America
    &[
        (-168.0, 65.0), (-166.0, 60.0), (-141.0, 60.0), (-130.0, 55.0), (-125.0, 48.0),
        (-124.0, 40.0), (-117.0, 32.0), (-110.0, 25.0), (-97.0, 25.0), (-97.0, 28.0),
        (-82.0, 24.0), (-80.0, 25.0), (-81.0, 31.0), (-75.0, 35.0), (-70.0, 41.0),
        (-67.0, 45.0), (-55.0, 47.0), (-58.0, 55.0), (-64.0, 60.0), (-80.0, 63.0),
        (-95.0, 62.0), (-110.0, 68.0), (-145.0, 70.0), (-168.0, 65.0),
    ],
    // South America
    &[
        (-80.0, 10.0), (-70.0, 5.0), (-50.0, 0.0), (-35.0, -5.0), (-40.0, -22.0),
        (-55.0, -34.0), (-65.0, -42.0), (-68.0, -50.0), (-75.0, -52.0), (-72.0, -30.0),
        (-70.0, -15.0), (-80.0, -5.0), (-80.0, 10.0),
    ],
    // Europe
    &[
        (-10.0, 36.0), (0.0, 38.0), (10.0, 44.0), (20.0, 40.0), (30.0, 40.0),
        (40.0, 43.0), (40.0, 55.0), (30.0, 60.0), (20.0, 70.0), (5.0, 62.0),
        (-5.0, 58.0), (-10.0, 52.0), (-5.0, 43.0), (-10.0, 36.0),
    ],
    // Africa
    &[
        (-17.0, 15.0), (-15.0, 28.0), (-5.0, 35.0), (10.0, 37.0), (25.0, 32.0),
        (35.0, 30.0), (42.0, 12.0), (50.0, 12.0), (40.0, -5.0), (35.0, -25.0),
        (20.0, -35.0), (10.0, -15.0), (10.0, 0.0), (-10.0, 5.0), (-17.0, 15.0),
    ],
    // Asia
    &[
        (40.0, 43.0), (55.0, 37.0), (60.0, 25.0), (70.0, 20.0), (80.0, 8.0),
        (88.0, 22.0), (95.0, 16.0), (105.0, 10.0), (110.0, 20.0), (122.0, 25.0),
        (130.0, 35.0), (140.0, 40.0), (145.0, 50.0), (135.0, 55.0), (130.0, 43.0),
        (110.0, 45.0), (90.0, 50.0), (60.0, 55.0), (40.0, 43.0),
    ],
    // Australia
    &[
        (115.0, -20.0), (130.0, -12.0), (145.0, -15.0), (153.0, -30.0), (145.0, -38.0),
        (130.0, -32.0), (115.0, -35.0), (115.0, -20.0),
    ],
];

fn add_simple_world(renderer: &mut MapRenderer) {
    for outline in SIMPLE_CONTINENTS {
        renderer.add_coastline(outline.to_vec(), Lod::Low);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_fallback_when_directory_missing() {
        let mut renderer = MapRenderer::new();
        load_backdrop(&mut renderer, Path::new("/no/such/backdrop"));
        assert!(renderer.has_data());
    }

    #[test]
    fn test_reads_feature_collection() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = fs::File::create(dir.path().join("ne_110m_coastline.json")).unwrap();
        write!(
            file,
            r#"{{"type":"FeatureCollection","features":[
                {{"type":"Feature","properties":{{}},"geometry":{{"type":"LineString","coordinates":[[0,0],[1,1]]}}}},
                {{"type":"Feature","properties":{{}},"geometry":{{"type":"MultiPolygon","coordinates":[[[[0,0],[1,0],[1,1],[0,0]]],[[[5,5],[6,5],[6,6],[5,5]]]]}}}}
            ]}}"#
        )
        .unwrap();

        let lines = read_lines(&dir.path().join("ne_110m_coastline.json")).unwrap();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], vec![(0.0, 0.0), (1.0, 1.0)]);
    }

    #[test]
    fn test_short_positions_are_skipped() {
        let geometry = Geometry::new(Value::LineString(vec![
            vec![0.0, 0.0],
            vec![1.0],
            vec![2.0, 2.0, 5.0],
        ]));
        let mut lines = Vec::new();
        geometry_lines(&geometry, &mut |l| lines.push(l));
        assert_eq!(lines, vec![vec![(0.0, 0.0), (2.0, 2.0)]]);
    }

    #[test]
    fn test_invalid_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("ne_110m_coastline.json"), "not json").unwrap();
        let mut renderer = MapRenderer::new();
        load_backdrop(&mut renderer, dir.path());
        assert!(renderer.has_data());
    }
}
