//! Plain-text rendering of the views for `--summary`.

use crate::aggregate::Tally;
use crate::filter::{Selectors, ALL};
use crate::records::Table;
use crate::views::{ChartKind, ChartToggles, Views};
use std::fmt::Write;

const EMPTY_MESSAGE: &str = "No events match the current filters";

/// Maximum map points listed before eliding the rest
const MAX_POINTS: usize = 20;

/// Filter and render in one go. Selectors are taken as given: a country or
/// trigger the table does not contain yields an empty view.
pub fn run(table: &Table, selectors: &Selectors, toggles: &ChartToggles) -> String {
    render(&Views::render(table, selectors, toggles), selectors)
}

/// Render every enabled view as a text table.
pub fn render(views: &Views, selectors: &Selectors) -> String {
    let mut out = String::new();

    let years = selectors
        .years
        .map_or("-".to_string(), |r| format!("{}-{}", r.min, r.max));
    let country = selectors.country.label();
    let triggers = if selectors.triggers.includes_all() {
        ALL.to_string()
    } else {
        selectors.triggers.triggers().collect::<Vec<_>>().join(", ")
    };

    let _ = writeln!(
        out,
        "Years: {years}  Country: {country}  Triggers: {triggers}  Fatalities: {}",
        selectors.fatality
    );
    let _ = writeln!(out, "Events: {}/{}", views.active, views.total);

    if views.is_empty() {
        let _ = writeln!(out, "\n{EMPTY_MESSAGE}");
        return out;
    }

    if let Some(yearly) = &views.yearly {
        section(&mut out, ChartKind::Trend);
        for y in yearly {
            let _ = writeln!(out, "  {:<6} {:>8}", y.year, y.count);
        }
    }

    if let Some(triggers) = &views.triggers {
        section(&mut out, ChartKind::Triggers);
        tallies(&mut out, triggers);
    }

    if let Some(fatalities) = &views.fatalities {
        section(&mut out, ChartKind::Fatalities);
        for y in fatalities {
            let _ = writeln!(out, "  {:<6} {:>8}", y.year, y.fatalities);
        }
    }

    if let Some(sizes) = &views.sizes {
        section(&mut out, ChartKind::Sizes);
        let total: usize = sizes.iter().map(|t| t.count).sum();
        for t in sizes {
            let pct = 100.0 * t.count as f64 / total.max(1) as f64;
            let _ = writeln!(out, "  {:<24} {:>8} {:>6.1}%", t.label, t.count, pct);
        }
    }

    if let Some(points) = &views.points {
        section(&mut out, ChartKind::Map);
        let _ = writeln!(out, "  {} events with coordinates", points.len());
        for p in points.iter().take(MAX_POINTS) {
            let _ = writeln!(
                out,
                "  {:>8.3} {:>9.3}  {}  [{}, {}, fatalities {}]",
                p.lat,
                p.lon,
                p.title,
                p.country.as_deref().unwrap_or("-"),
                p.trigger.as_deref().unwrap_or("-"),
                p.fatalities
            );
        }
        if points.len() > MAX_POINTS {
            let _ = writeln!(out, "  ... {} more", points.len() - MAX_POINTS);
        }
    }

    out
}

fn section(out: &mut String, kind: ChartKind) {
    let title = kind.title();
    let _ = writeln!(out, "\n{title}\n{}", "-".repeat(title.len()));
}

fn tallies(out: &mut String, tallies: &[Tally]) {
    for t in tallies {
        let _ = writeln!(out, "  {:<24} {:>8}", t.label, t.count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::tests::sample_table;
    use crate::filter::{FatalityFilter, YearRange};

    #[test]
    fn test_lists_each_enabled_view() {
        let table = sample_table();
        let sel = Selectors::defaults_for(&table);
        let text = render(&Views::render(&table, &sel, &ChartToggles::default()), &sel);

        assert!(text.contains("Events: 7/7"));
        for kind in ChartKind::ALL {
            assert!(text.contains(kind.title()), "missing {}", kind.title());
        }
        assert!(text.contains("rain"));
        assert!(text.contains("7 events with coordinates"));
    }

    #[test]
    fn test_disabled_views_are_omitted() {
        let table = sample_table();
        let sel = Selectors {
            fatality: FatalityFilter::FatalOnly,
            ..Selectors::defaults_for(&table)
        };
        let toggles = ChartToggles {
            map: false,
            sizes: false,
            ..ChartToggles::default()
        };
        let text = render(&Views::render(&table, &sel, &toggles), &sel);

        assert!(text.contains("Fatalities: Fatal only"));
        assert!(text.contains("Events: 3/7"));
        assert!(!text.contains(ChartKind::Map.title()));
        assert!(!text.contains(ChartKind::Sizes.title()));
    }

    #[test]
    fn test_unknown_country_is_not_widened() {
        let table = sample_table();
        let sel = Selectors {
            country: crate::filter::CountrySelector::Only("Atlantis".into()),
            ..Selectors::defaults_for(&table)
        };
        let text = run(&table, &sel, &ChartToggles::default());
        assert!(text.contains("Country: Atlantis"));
        assert!(text.contains("Events: 0/7"));
        assert!(text.contains(EMPTY_MESSAGE));
    }

    #[test]
    fn test_empty_view_message() {
        let table = sample_table();
        let sel = Selectors {
            years: Some(YearRange::new(2012, 2012)),
            ..Selectors::defaults_for(&table)
        };
        let text = render(&Views::render(&table, &sel, &ChartToggles::default()), &sel);
        assert!(text.contains(EMPTY_MESSAGE));
        assert!(!text.contains(ChartKind::Trend.title()));
    }
}
