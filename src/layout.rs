use crate::views::{ChartKind, ChartToggles};
use ratatui::layout::{Constraint, Direction, Layout, Margin, Rect};

/// Sidebar width in columns
pub const SIDEBAR_WIDTH: u16 = 34;

/// Screen regions for one frame. Shared by drawing and mouse hit-testing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DashboardLayout {
    pub sidebar: Rect,
    pub charts: Vec<(ChartKind, Rect)>,
    pub status: Rect,
}

impl DashboardLayout {
    /// Outer rectangle of a visible chart
    pub fn chart(&self, kind: ChartKind) -> Option<Rect> {
        self.charts.iter().find(|(k, _)| *k == kind).map(|(_, r)| *r)
    }

    /// Drawable area of the map inside its border
    pub fn map_inner(&self) -> Option<Rect> {
        self.chart(ChartKind::Map).map(bordered_inner)
    }
}

/// Area inside a one-cell border
pub fn bordered_inner(area: Rect) -> Rect {
    area.inner(Margin::new(1, 1))
}

/// Split the terminal: sidebar on the left, status bar at the bottom, charts
/// in the remaining space. The map takes the lower half when shown; other
/// charts tile two per row above it.
pub fn dashboard(area: Rect, toggles: &ChartToggles) -> DashboardLayout {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(area);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(10)])
        .split(rows[0]);

    let main = columns[1];
    let others: Vec<ChartKind> = toggles.shown().filter(|k| *k != ChartKind::Map).collect();

    let mut charts = Vec::new();
    let grid_area = if toggles.map {
        if others.is_empty() {
            charts.push((ChartKind::Map, main));
            None
        } else {
            let halves = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                .split(main);
            charts.push((ChartKind::Map, halves[1]));
            Some(halves[0])
        }
    } else {
        Some(main)
    };

    if let Some(grid) = grid_area.filter(|_| !others.is_empty()) {
        let row_count = others.len().div_ceil(2);
        let grid_rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints(vec![Constraint::Ratio(1, row_count as u32); row_count])
            .split(grid);

        for (row_area, pair) in grid_rows.iter().zip(others.chunks(2)) {
            let cells = Layout::default()
                .direction(Direction::Horizontal)
                .constraints(vec![Constraint::Ratio(1, pair.len() as u32); pair.len()])
                .split(*row_area);
            for (kind, cell) in pair.iter().zip(cells.iter()) {
                charts.push((*kind, *cell));
            }
        }
    }

    // Keep sidebar order for drawing
    charts.sort_by_key(|(kind, _)| ChartKind::ALL.iter().position(|k| k == kind));

    DashboardLayout {
        sidebar: columns[0],
        charts,
        status: rows[1],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn screen() -> Rect {
        Rect::new(0, 0, 134, 41)
    }

    #[test]
    fn test_all_charts_visible() {
        let layout = dashboard(screen(), &ChartToggles::default());
        assert_eq!(layout.charts.len(), 5);
        assert_eq!(layout.sidebar.width, SIDEBAR_WIDTH);
        assert_eq!(layout.status.height, 1);

        let map = layout.chart(ChartKind::Map).unwrap();
        let trend = layout.chart(ChartKind::Trend).unwrap();
        assert!(map.y > trend.y);
        assert_eq!(map.width, screen().width - SIDEBAR_WIDTH);
    }

    #[test]
    fn test_map_alone_fills_main_area() {
        let toggles = ChartToggles {
            trend: false,
            triggers: false,
            fatalities: false,
            sizes: false,
            map: true,
        };
        let layout = dashboard(screen(), &toggles);
        let map = layout.chart(ChartKind::Map).unwrap();
        assert_eq!(map.height, screen().height - 1);
        assert_eq!(layout.map_inner().unwrap().width, map.width - 2);
    }

    #[test]
    fn test_three_charts_without_map() {
        let toggles = ChartToggles {
            map: false,
            fatalities: false,
            ..ChartToggles::default()
        };
        let layout = dashboard(screen(), &toggles);
        let kinds: Vec<_> = layout.charts.iter().map(|(k, _)| *k).collect();
        assert_eq!(kinds, vec![ChartKind::Trend, ChartKind::Triggers, ChartKind::Sizes]);
        assert!(layout.map_inner().is_none());

        let sizes = layout.chart(ChartKind::Sizes).unwrap();
        let trend = layout.chart(ChartKind::Trend).unwrap();
        assert!(sizes.y > trend.y);
    }

    #[test]
    fn test_nothing_visible() {
        let toggles = ChartToggles {
            trend: false,
            triggers: false,
            fatalities: false,
            sizes: false,
            map: false,
        };
        assert!(dashboard(screen(), &toggles).charts.is_empty());
    }
}
