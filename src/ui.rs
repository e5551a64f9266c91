use crate::aggregate::{MapPoint, Tally};
use crate::app::{App, Control};
use crate::braille::BrailleCanvas;
use crate::filter::{FatalityFilter, ALL};
use crate::layout::bordered_inner;
use crate::map::{fill_sector, MapLayers};
use crate::views::ChartKind;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        Axis, Bar, BarChart, BarGroup, Block, Borders, Chart, Clear, Dataset, GraphType,
        Paragraph, Widget,
    },
    Frame,
};

/// Series colours, assigned to triggers by rank and to pie slices by order
const PALETTE: [Color; 10] = [
    Color::Yellow,
    Color::LightRed,
    Color::LightGreen,
    Color::LightMagenta,
    Color::LightBlue,
    Color::Red,
    Color::Green,
    Color::Magenta,
    Color::LightCyan,
    Color::White,
];

/// Colour for events with no recorded trigger
const UNKNOWN_COLOR: Color = Color::Gray;

const EMPTY_MESSAGE: &str = "No events match the current filters";

/// Shown when events match but none carries a value for the chart
const NO_VALUES_MESSAGE: &str = "No recorded values for the matching events";

/// Render the UI
pub fn render(frame: &mut Frame, app: &App) {
    let layout = app.layout();

    render_sidebar(frame, app, layout.sidebar);

    for (kind, area) in &layout.charts {
        match kind {
            ChartKind::Trend => render_trend(frame, app, *area),
            ChartKind::Triggers => render_triggers(frame, app, *area),
            ChartKind::Fatalities => render_fatalities(frame, app, *area),
            ChartKind::Sizes => render_sizes(frame, app, *area),
            ChartKind::Map => render_map(frame, app, *area),
        }
    }

    if layout.charts.is_empty() {
        let main = Rect {
            x: layout.sidebar.right(),
            width: frame.area().width.saturating_sub(layout.sidebar.width),
            ..layout.sidebar
        };
        render_placeholder(frame, main, "All charts hidden");
    }

    render_status_bar(frame, app, layout.status);
}

fn chart_block(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            format!(" {title} "),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ))
}

fn render_placeholder(frame: &mut Frame, area: Rect, message: &str) {
    let inner = bordered_inner(area);
    let top = inner.height / 2;
    let centered = Rect {
        y: inner.y + top,
        height: inner.height.saturating_sub(top).min(1),
        ..inner
    };
    frame.render_widget(
        Paragraph::new(message)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center),
        centered,
    );
}

fn empty_message(app: &App) -> &'static str {
    if app.views.is_empty() {
        EMPTY_MESSAGE
    } else {
        NO_VALUES_MESSAGE
    }
}

/// Palette colour for a trigger's colour group
fn group_color(app: &App, group: usize) -> Color {
    if group + 1 >= app.trigger_groups() {
        UNKNOWN_COLOR
    } else {
        PALETTE[group % PALETTE.len()]
    }
}

// Sidebar

fn render_sidebar(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            " Filters ",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let focused = app.focused();
    let header = |text: &'static str| {
        Line::from(Span::styled(
            text,
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ))
    };
    let row = |control: Control, text: String| {
        let style = if control == focused {
            Style::default().fg(Color::Black).bg(Color::Yellow)
        } else {
            Style::default().fg(Color::White)
        };
        Line::from(Span::styled(text, style))
    };

    let (from, to) = app
        .selectors
        .years
        .map_or(("-".to_string(), "-".to_string()), |r| (r.min.to_string(), r.max.to_string()));

    let mut lines = vec![
        header("Year range"),
        row(Control::YearFrom, format!(" from ◀ {from} ▶")),
        row(Control::YearTo, format!(" to   ◀ {to} ▶")),
        Line::default(),
        header("Country"),
        row(Control::Country, format!(" ◀ {} ▶", app.selectors.country.label())),
        Line::default(),
        header("Trigger(s)"),
    ];

    // Fixed rows besides the trigger list
    const FIXED_ROWS: u16 = 20;
    let window = inner.height.saturating_sub(FIXED_ROWS).max(3) as usize;
    lines.extend(trigger_list(app, focused == Control::Triggers, window));

    lines.push(Line::default());
    lines.push(header("Fatalities"));
    for option in FatalityFilter::OPTIONS {
        let mark = if app.selectors.fatality == option { "(•)" } else { "( )" };
        let text = format!(" {mark} {}", option.label());
        if focused == Control::Fatality && app.selectors.fatality == option {
            lines.push(row(Control::Fatality, text));
        } else {
            lines.push(Line::from(text));
        }
    }

    lines.push(Line::default());
    lines.push(header("Show/Hide Visuals"));
    for kind in ChartKind::ALL {
        let mark = if app.toggles.is_shown(kind) { "[x]" } else { "[ ]" };
        lines.push(row(Control::Chart(kind), format!(" {mark} {}", kind.title())));
    }

    frame.render_widget(Paragraph::new(lines), inner);
}

/// Scrolling window over "All" plus the trigger options
fn trigger_list(app: &App, focused: bool, window: usize) -> Vec<Line<'static>> {
    let total = app.views.options.triggers.len() + 1;
    let start = app
        .trigger_cursor
        .saturating_sub(window / 2)
        .min(total.saturating_sub(window));

    (start..total.min(start + window))
        .map(|idx| {
            let label = app.trigger_label(idx);
            let checked = app.selectors.triggers.contains(label);
            let text = format!(
                "{}[{}] {}",
                if focused && idx == app.trigger_cursor { "›" } else { " " },
                if checked { "x" } else { " " },
                label
            );
            let color = if label == ALL {
                Color::White
            } else {
                group_color(app, app.trigger_group(Some(label)))
            };
            let mut style = Style::default().fg(color);
            if focused && idx == app.trigger_cursor {
                style = style.add_modifier(Modifier::REVERSED);
            }
            Line::from(Span::styled(text, style))
        })
        .collect()
}

// Charts

fn axis_style() -> Style {
    Style::default().fg(Color::DarkGray)
}

/// Axis bounds padded so a single year still spans some width
fn year_bounds(years: impl Iterator<Item = i32> + Clone) -> [f64; 2] {
    let lo = years.clone().min().unwrap_or(0) as f64;
    let hi = years.max().unwrap_or(0) as f64;
    if lo == hi {
        [lo - 1.0, hi + 1.0]
    } else {
        [lo, hi]
    }
}

fn render_trend(frame: &mut Frame, app: &App, area: Rect) {
    let title = ChartKind::Trend.title();
    let yearly = app.views.yearly.as_deref().unwrap_or_default();
    if yearly.is_empty() {
        frame.render_widget(chart_block(title), area);
        render_placeholder(frame, area, empty_message(app));
        return;
    }

    let data: Vec<(f64, f64)> = yearly.iter().map(|y| (y.year as f64, y.count as f64)).collect();
    let x_bounds = year_bounds(yearly.iter().map(|y| y.year));
    let y_max = yearly.iter().map(|y| y.count).max().unwrap_or(0) as f64;

    let datasets = vec![
        Dataset::default()
            .marker(Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Yellow))
            .data(&data),
        Dataset::default()
            .marker(Marker::Dot)
            .graph_type(GraphType::Scatter)
            .style(Style::default().fg(Color::LightRed))
            .data(&data),
    ];

    let chart = Chart::new(datasets)
        .block(chart_block(title))
        .x_axis(
            Axis::default()
                .title("year")
                .style(axis_style())
                .bounds(x_bounds)
                .labels([format!("{}", x_bounds[0]), format!("{}", x_bounds[1])]),
        )
        .y_axis(
            Axis::default()
                .title("count")
                .style(axis_style())
                .bounds([0.0, (y_max * 1.1).max(1.0)])
                .labels(["0".to_string(), format!("{y_max}")]),
        );
    frame.render_widget(chart, area);
}

fn render_triggers(frame: &mut Frame, app: &App, area: Rect) {
    let title = ChartKind::Triggers.title();
    let tallies = app.views.triggers.as_deref().unwrap_or_default();
    if tallies.is_empty() {
        frame.render_widget(chart_block(title), area);
        render_placeholder(frame, area, empty_message(app));
        return;
    }

    // Horizontal bars leave room for long trigger names
    let inner = bordered_inner(area);
    let label_width = (inner.width / 3).max(4) as usize;
    let bars: Vec<Bar> = tallies
        .iter()
        .map(|t| {
            let color = group_color(app, app.trigger_group(Some(&t.label)));
            Bar::default()
                .value(t.count as u64)
                .label(Line::from(truncate(&t.label, label_width)))
                .style(Style::default().fg(color))
                .value_style(Style::default().fg(Color::Black).bg(color))
        })
        .collect();

    let chart = BarChart::default()
        .block(chart_block(title))
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(0)
        .data(BarGroup::default().bars(&bars));
    frame.render_widget(chart, area);
}

fn render_fatalities(frame: &mut Frame, app: &App, area: Rect) {
    let title = ChartKind::Fatalities.title();
    let per_year = app.views.fatalities.as_deref().unwrap_or_default();
    if per_year.is_empty() {
        frame.render_widget(chart_block(title), area);
        render_placeholder(frame, area, empty_message(app));
        return;
    }

    let inner = bordered_inner(area);
    let n = per_year.len() as u16;
    let gap = u16::from(inner.width >= n * 3);
    let bar_width = (inner.width.saturating_sub(gap * n) / n.max(1)).clamp(1, 6);

    let bars: Vec<Bar> = per_year
        .iter()
        .map(|y| {
            // Two-digit years once bars get narrow
            let label = if bar_width >= 4 {
                y.year.to_string()
            } else {
                format!("{:02}", y.year.rem_euclid(100))
            };
            Bar::default()
                .value(y.fatalities)
                .label(Line::from(label))
                .style(Style::default().fg(Color::LightRed))
                .value_style(Style::default().fg(Color::Black).bg(Color::LightRed))
        })
        .collect();

    let chart = BarChart::default()
        .block(chart_block(title))
        .bar_width(bar_width)
        .bar_gap(gap)
        .data(BarGroup::default().bars(&bars));
    frame.render_widget(chart, area);
}

fn render_sizes(frame: &mut Frame, app: &App, area: Rect) {
    let title = ChartKind::Sizes.title();
    let block = chart_block(title);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let tallies = app.views.sizes.as_deref().unwrap_or_default();
    if tallies.is_empty() {
        render_placeholder(frame, area, empty_message(app));
        return;
    }

    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(inner);

    frame.render_widget(PieWidget { tallies }, halves[0]);

    let total: usize = tallies.iter().map(|t| t.count).sum();
    let legend: Vec<Line> = tallies
        .iter()
        .enumerate()
        .map(|(i, t)| {
            let pct = 100.0 * t.count as f64 / total.max(1) as f64;
            Line::from(vec![
                Span::styled("■ ", Style::default().fg(PALETTE[i % PALETTE.len()])),
                Span::raw(format!("{} {} ({pct:.1}%)", t.label, t.count)),
            ])
        })
        .collect();
    frame.render_widget(Paragraph::new(legend), halves[1]);
}

/// Braille pie: one canvas per slice, painted in slice colour
struct PieWidget<'a> {
    tallies: &'a [Tally],
}

impl Widget for PieWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let cols = area.width as usize;
        let rows = area.height as usize;
        let (w, h) = (cols as i32 * 2, rows as i32 * 4);
        let radius = (w.min(h) / 2 - 1).max(1);
        let (cx, cy) = (w / 2, h / 2);

        let total: usize = self.tallies.iter().map(|t| t.count).sum();
        if total == 0 {
            return;
        }

        let mut start = 0.0;
        for (i, tally) in self.tallies.iter().enumerate() {
            let end = start + tally.count as f64 / total as f64;
            let mut canvas = BrailleCanvas::new(cols, rows);
            fill_sector(&mut canvas, cx, cy, radius, start, end);
            paint(&canvas, PALETTE[i % PALETTE.len()], area, buf);
            start = end;
        }
    }
}

/// Copy a canvas's glyphs into the buffer in one colour
fn paint(canvas: &BrailleCanvas, color: Color, area: Rect, buf: &mut Buffer) {
    for (col, row, ch) in canvas.glyphs() {
        if col >= area.width as usize || row >= area.height as usize {
            continue;
        }
        let x = area.x + col as u16;
        let y = area.y + row as u16;
        buf[(x, y)].set_char(ch).set_fg(color);
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let mut out: String = text.chars().take(max.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}

// Map

fn render_map(frame: &mut Frame, app: &App, area: Rect) {
    let block = chart_block(ChartKind::Map.title());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let points = app.views.points.as_deref().unwrap_or_default();
    let viewport = app.viewport.sized_for(inner.width, inner.height);
    let layers = app.map_renderer.render(
        inner.width as usize,
        inner.height as usize,
        &viewport,
        points,
        app.trigger_groups(),
        |p| app.trigger_group(p.trigger.as_deref()),
    );

    let colors: Vec<Color> = (0..app.trigger_groups()).map(|g| group_color(app, g)).collect();
    frame.render_widget(MapWidget { layers, colors }, inner);

    if points.is_empty() {
        render_placeholder(frame, area, empty_message(app));
        return;
    }

    render_map_legend(frame, app, points, inner);

    if let (Some(point), Some((col, row))) = (app.hovered_point(), app.mouse_pos) {
        render_tooltip(frame, point, col, row, inner);
    }
}

/// Braille map with one colour per layer
struct MapWidget {
    layers: MapLayers,
    colors: Vec<Color>,
}

impl Widget for MapWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        paint(&self.layers.coastlines, Color::DarkGray, area, buf);
        paint(&self.layers.borders, Color::DarkGray, area, buf);

        for (canvas, color) in self.layers.events.iter().zip(&self.colors) {
            paint(canvas, *color, area, buf);
        }
    }
}

/// Trigger colour key in the map's top-right corner
fn render_map_legend(frame: &mut Frame, app: &App, points: &[MapPoint], inner: Rect) {
    let mut groups: Vec<(usize, &str)> = points
        .iter()
        .map(|p| {
            let trigger = p.trigger.as_deref();
            (app.trigger_group(trigger), trigger.unwrap_or("unknown"))
        })
        .collect();
    groups.sort_unstable();
    groups.dedup();

    let max_rows = inner.height.saturating_sub(1) as usize;
    let lines: Vec<Line> = groups
        .iter()
        .take(max_rows)
        .map(|(g, label)| {
            Line::from(vec![
                Span::styled("● ", Style::default().fg(group_color(app, *g))),
                Span::styled(truncate(label, 18), Style::default().fg(Color::Gray)),
            ])
        })
        .collect();

    let width = lines.iter().map(Line::width).max().unwrap_or(0) as u16;
    if width == 0 || width + 2 > inner.width {
        return;
    }
    let legend = Rect {
        x: inner.right() - width,
        y: inner.y,
        width,
        height: lines.len() as u16,
    };
    frame.render_widget(Clear, legend);
    frame.render_widget(Paragraph::new(lines), legend);
}

fn render_tooltip(frame: &mut Frame, point: &MapPoint, col: u16, row: u16, inner: Rect) {
    let lines = vec![
        Line::from(Span::styled(
            truncate(&point.title, 40),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        )),
        Line::from(format!("country: {}", point.country.as_deref().unwrap_or("-"))),
        Line::from(format!("trigger: {}", point.trigger.as_deref().unwrap_or("-"))),
        Line::from(format!("fatalities: {}", point.fatalities)),
    ];

    let width = (lines.iter().map(Line::width).max().unwrap_or(0) as u16 + 2).min(inner.width);
    let height = (lines.len() as u16 + 2).min(inner.height);

    // Prefer below-right of the cursor, flip when it would overflow
    let x = if col + 2 + width <= inner.right() {
        col + 2
    } else {
        col.saturating_sub(width + 1).max(inner.x)
    };
    let y = if row + 1 + height <= inner.bottom() {
        row + 1
    } else {
        row.saturating_sub(height).max(inner.y)
    };

    let area = Rect { x, y, width, height };
    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow)),
        ),
        area,
    );
}

// Status bar

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let key = |on: bool| Style::default().fg(if on { Color::Green } else { Color::DarkGray });
    let dim = Style::default().fg(Color::DarkGray);

    let status = Line::from(vec![
        Span::styled(" Events: ", dim),
        Span::styled(
            format!("{}/{}", app.views.active, app.views.total),
            Style::default().fg(Color::Yellow),
        ),
        Span::styled(format!(" (dropped {}) ", app.table().dropped()), dim),
        Span::styled("| Zoom: ", dim),
        Span::styled(app.zoom_level(), Style::default().fg(Color::Yellow)),
        Span::styled(" (", dim),
        Span::styled(app.lod_level(), Style::default().fg(Color::Magenta)),
        Span::styled(") ", dim),
        Span::styled(
            if app.map_renderer.show_borders { "[B]orders " } else { "[b]orders " },
            key(app.map_renderer.show_borders),
        ),
        Span::styled(
            "| tab/↑↓:focus ←→:adjust space:toggle r:reset hjkl:pan +/-:zoom 0:recentre q:quit",
            dim,
        ),
    ]);

    frame.render_widget(Paragraph::new(status), area);
}
