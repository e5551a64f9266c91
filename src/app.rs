use crate::aggregate::MapPoint;
use crate::filter::{CountrySelector, FatalityFilter, Selectors, YearRange, ALL};
use crate::layout::{self, DashboardLayout};
use crate::map::{Lod, MapRenderer, SpatialGrid, Viewport};
use crate::records::Table;
use crate::views::{ChartKind, ChartToggles, Views};
use ratatui::layout::Rect;
use tracing::debug;

/// Hover pick radius in braille dots
const HOVER_RADIUS_PX: i32 = 4;

/// Spatial index cell size in degrees
const INDEX_CELL_DEGREES: f64 = 1.0;

/// Focusable sidebar controls, top to bottom
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Control {
    YearFrom,
    YearTo,
    Country,
    Triggers,
    Fatality,
    Chart(ChartKind),
}

impl Control {
    pub const ORDER: [Control; 10] = [
        Control::YearFrom,
        Control::YearTo,
        Control::Country,
        Control::Triggers,
        Control::Fatality,
        Control::Chart(ChartKind::Trend),
        Control::Chart(ChartKind::Triggers),
        Control::Chart(ChartKind::Fatalities),
        Control::Chart(ChartKind::Sizes),
        Control::Chart(ChartKind::Map),
    ];
}

/// Application state
pub struct App {
    table: Table,
    pub selectors: Selectors,
    pub toggles: ChartToggles,
    /// Views for the current selectors, rebuilt on every change
    pub views: Views,
    focus: usize,
    /// Cursor in the trigger list; 0 is the "All" entry
    pub trigger_cursor: usize,
    pub viewport: Viewport,
    pub map_renderer: MapRenderer,
    /// Every trigger in the table, sorted; fixes each trigger's colour
    trigger_keys: Vec<String>,
    point_index: SpatialGrid,
    screen: Rect,
    pub should_quit: bool,
    /// Last mouse position for drag tracking
    pub last_mouse: Option<(u16, u16)>,
    /// Current mouse position for hover
    pub mouse_pos: Option<(u16, u16)>,
}

impl App {
    pub fn new(
        table: Table,
        map_renderer: MapRenderer,
        toggles: ChartToggles,
        width: u16,
        height: u16,
    ) -> Self {
        let selectors = Selectors::defaults_for(&table);
        let trigger_keys = crate::filter::View::of(&table).triggers();

        let mut app = Self {
            table,
            selectors,
            toggles,
            views: Views::default(),
            focus: 0,
            trigger_cursor: 0,
            viewport: Viewport::world(0, 0),
            map_renderer,
            trigger_keys,
            point_index: SpatialGrid::new(INDEX_CELL_DEGREES),
            screen: Rect::new(0, 0, width, height),
            should_quit: false,
            last_mouse: None,
            mouse_pos: None,
        };
        app.sync_viewport();
        app.refresh();
        app
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn layout(&self) -> DashboardLayout {
        layout::dashboard(self.screen, &self.toggles)
    }

    pub fn focused(&self) -> Control {
        Control::ORDER[self.focus]
    }

    /// Recompute views from scratch after any selector or toggle change
    fn refresh(&mut self) {
        self.views = Views::render_reconciled(&self.table, &mut self.selectors, &self.toggles);

        let points = self.views.points.as_deref().unwrap_or_default();
        self.point_index =
            SpatialGrid::build(points.iter().map(|p| (p.lon, p.lat)), INDEX_CELL_DEGREES);

        self.trigger_cursor = self.trigger_cursor.min(self.views.options.triggers.len());
        debug!(
            active = self.views.active,
            points = self.point_index.len(),
            "views refreshed"
        );
    }

    /// Keep the viewport's dot size in step with the map pane
    fn sync_viewport(&mut self) {
        if let Some(inner) = self.layout().map_inner() {
            self.viewport = self.viewport.sized_for(inner.width, inner.height);
        }
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.screen = Rect::new(0, 0, width, height);
        self.sync_viewport();
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn focus_next(&mut self) {
        self.focus = (self.focus + 1) % Control::ORDER.len();
    }

    pub fn focus_prev(&mut self) {
        self.focus = (self.focus + Control::ORDER.len() - 1) % Control::ORDER.len();
    }

    /// Left/right on the focused control
    pub fn adjust(&mut self, delta: i32) {
        let bounds = self.views.options.year_bounds;
        match self.focused() {
            Control::YearFrom => {
                if let (Some(range), Some((lo, _))) = (self.selectors.years, bounds) {
                    let min = (range.min + delta).clamp(lo, range.max);
                    self.selectors.years = Some(YearRange::new(min, range.max));
                }
            }
            Control::YearTo => {
                if let (Some(range), Some((_, hi))) = (self.selectors.years, bounds) {
                    let max = (range.max + delta).clamp(range.min, hi);
                    self.selectors.years = Some(YearRange::new(range.min, max));
                }
            }
            Control::Country => self.cycle_country(delta),
            Control::Triggers => {
                let last = self.views.options.triggers.len() as i32;
                self.trigger_cursor = (self.trigger_cursor as i32 + delta).clamp(0, last) as usize;
                return;
            }
            Control::Fatality => self.cycle_fatality(delta),
            Control::Chart(_) => return,
        }
        self.refresh();
    }

    /// Space/Enter on the focused control
    pub fn activate(&mut self) {
        match self.focused() {
            Control::Triggers => {
                let label = self.trigger_label(self.trigger_cursor).to_string();
                self.selectors.triggers.toggle(&label);
            }
            Control::Chart(kind) => {
                self.toggles.toggle(kind);
                self.sync_viewport();
            }
            Control::Country => self.cycle_country(1),
            Control::Fatality => self.cycle_fatality(1),
            Control::YearFrom | Control::YearTo => return,
        }
        self.refresh();
    }

    /// Label at a trigger-list position; 0 is the "All" entry
    pub fn trigger_label(&self, idx: usize) -> &str {
        match idx {
            0 => ALL,
            i => self
                .views
                .options
                .triggers
                .get(i - 1)
                .map_or(ALL, String::as_str),
        }
    }

    fn cycle_country(&mut self, delta: i32) {
        let countries = &self.views.options.countries;
        // Position 0 is "All"
        let current = match &self.selectors.country {
            CountrySelector::All => 0,
            CountrySelector::Only(name) => {
                countries.iter().position(|c| c == name).map_or(0, |i| i + 1)
            }
        };
        let len = countries.len() as i32 + 1;
        let next = (current as i32 + delta).rem_euclid(len) as usize;
        self.selectors.country = match next {
            0 => CountrySelector::All,
            i => CountrySelector::Only(countries[i - 1].clone()),
        };
    }

    fn cycle_fatality(&mut self, delta: i32) {
        let options = FatalityFilter::OPTIONS;
        let current = options
            .iter()
            .position(|f| *f == self.selectors.fatality)
            .unwrap_or(0) as i32;
        let next = (current + delta).rem_euclid(options.len() as i32) as usize;
        self.selectors.fatality = options[next];
    }

    /// Restore default filters (full year range, everything "All")
    pub fn reset_filters(&mut self) {
        self.selectors = Selectors::defaults_for(&self.table);
        self.trigger_cursor = 0;
        self.refresh();
    }

    /// Colour group of a trigger: its rank among all triggers, unknowns last
    pub fn trigger_group(&self, trigger: Option<&str>) -> usize {
        trigger
            .and_then(|t| self.trigger_keys.binary_search_by(|k| k.as_str().cmp(t)).ok())
            .unwrap_or(self.trigger_keys.len())
    }

    /// Number of colour groups, including the unknown-trigger group
    pub fn trigger_groups(&self) -> usize {
        self.trigger_keys.len() + 1
    }

    pub fn toggle_borders(&mut self) {
        self.map_renderer.toggle_borders();
    }

    pub fn pan(&mut self, dx: i32, dy: i32) {
        self.viewport.pan(dx, dy);
    }

    pub fn zoom_in(&mut self) {
        self.viewport.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.viewport.zoom_out();
    }

    pub fn reset_map(&mut self) {
        self.viewport = Viewport::world(self.viewport.width, self.viewport.height);
    }

    /// Terminal cell to map dot coordinates, if the cell is over the map
    fn map_pixel(&self, col: u16, row: u16) -> Option<(i32, i32)> {
        let inner = self.layout().map_inner()?;
        let inside = col >= inner.x
            && col < inner.x + inner.width
            && row >= inner.y
            && row < inner.y + inner.height;
        inside.then(|| {
            (
                (col - inner.x) as i32 * 2 + 1,
                (row - inner.y) as i32 * 4 + 2,
            )
        })
    }

    pub fn zoom_in_at(&mut self, col: u16, row: u16) {
        if let Some((px, py)) = self.map_pixel(col, row) {
            self.viewport.zoom_in_at(px, py);
        }
    }

    pub fn zoom_out_at(&mut self, col: u16, row: u16) {
        if let Some((px, py)) = self.map_pixel(col, row) {
            self.viewport.zoom_out_at(px, py);
        }
    }

    /// Start a drag if the press is over the map
    pub fn begin_drag(&mut self, col: u16, row: u16) {
        self.last_mouse = self.map_pixel(col, row).map(|_| (col, row));
    }

    pub fn handle_drag(&mut self, x: u16, y: u16) {
        if let Some((last_x, last_y)) = self.last_mouse {
            let dx = last_x as i32 - x as i32;
            let dy = last_y as i32 - y as i32;
            // One cell is 2x4 dots
            self.pan(dx * 2, dy * 4);
            self.last_mouse = Some((x, y));
        }
    }

    pub fn end_drag(&mut self) {
        self.last_mouse = None;
    }

    pub fn set_mouse_pos(&mut self, col: u16, row: u16) {
        self.mouse_pos = Some((col, row));
    }

    /// Event closest to the mouse, within a few dots
    pub fn hovered_point(&self) -> Option<&MapPoint> {
        let (col, row) = self.mouse_pos?;
        let (px, py) = self.map_pixel(col, row)?;
        let points = self.views.points.as_deref()?;

        let (lon, lat) = self.viewport.unproject(px, py);
        let radius = HOVER_RADIUS_PX as f64 * self.viewport.degrees_per_pixel();

        self.point_index
            .query_radius(lon, lat, radius)
            .into_iter()
            .filter_map(|idx| points.get(idx))
            .map(|p| {
                let (x, y) = self.viewport.project(p.lon, p.lat);
                ((x - px).pow(2) + (y - py).pow(2), p)
            })
            .filter(|(d2, _)| *d2 <= HOVER_RADIUS_PX * HOVER_RADIUS_PX)
            .min_by_key(|(d2, _)| *d2)
            .map(|(_, p)| p)
    }

    pub fn zoom_level(&self) -> String {
        format!("{:.1}x", self.viewport.zoom)
    }

    pub fn lod_level(&self) -> &'static str {
        Lod::from_zoom(self.viewport.zoom).label()
    }
}
