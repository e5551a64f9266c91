use crate::aggregate::{self, MapPoint, Tally, YearCount, YearFatalities};
use crate::filter::{self, FilterOptions, Selectors};
use crate::records::Table;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Which charts are shown
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartToggles {
    pub trend: bool,
    pub triggers: bool,
    pub fatalities: bool,
    pub sizes: bool,
    pub map: bool,
}

impl Default for ChartToggles {
    fn default() -> Self {
        Self {
            trend: true,
            triggers: true,
            fatalities: true,
            sizes: true,
            map: true,
        }
    }
}

/// The five charts, in sidebar order
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChartKind {
    Trend,
    Triggers,
    Fatalities,
    Sizes,
    Map,
}

impl ChartKind {
    pub const ALL: [ChartKind; 5] = [
        ChartKind::Trend,
        ChartKind::Triggers,
        ChartKind::Fatalities,
        ChartKind::Sizes,
        ChartKind::Map,
    ];

    pub fn title(self) -> &'static str {
        match self {
            ChartKind::Trend => "Landslides per Year",
            ChartKind::Triggers => "Landslide Triggers",
            ChartKind::Fatalities => "Fatalities per Year",
            ChartKind::Sizes => "Landslide Size Distribution",
            ChartKind::Map => "Landslide Map",
        }
    }
}

impl ChartToggles {
    pub fn is_shown(&self, kind: ChartKind) -> bool {
        match kind {
            ChartKind::Trend => self.trend,
            ChartKind::Triggers => self.triggers,
            ChartKind::Fatalities => self.fatalities,
            ChartKind::Sizes => self.sizes,
            ChartKind::Map => self.map,
        }
    }

    pub fn toggle(&mut self, kind: ChartKind) {
        let flag = match kind {
            ChartKind::Trend => &mut self.trend,
            ChartKind::Triggers => &mut self.triggers,
            ChartKind::Fatalities => &mut self.fatalities,
            ChartKind::Sizes => &mut self.sizes,
            ChartKind::Map => &mut self.map,
        };
        *flag = !*flag;
    }

    /// Visible charts in display order
    pub fn shown(&self) -> impl Iterator<Item = ChartKind> + '_ {
        ChartKind::ALL.into_iter().filter(|k| self.is_shown(*k))
    }
}

/// Everything the screen needs for one frame. Hidden charts are `None`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Views {
    /// Rows in the loaded table
    pub total: usize,
    /// Rows in the active view
    pub active: usize,
    pub options: FilterOptions,
    pub yearly: Option<Vec<YearCount>>,
    pub triggers: Option<Vec<Tally>>,
    pub fatalities: Option<Vec<YearFatalities>>,
    pub sizes: Option<Vec<Tally>>,
    pub points: Option<Vec<MapPoint>>,
}

impl Views {
    /// Recompute every visible view from the table and the current selectors.
    /// Pure: same inputs, same output.
    pub fn render(table: &Table, selectors: &Selectors, toggles: &ChartToggles) -> Self {
        let filtered = filter::apply(table, selectors);
        let view = &filtered.view;

        debug!(
            total = table.len(),
            active = view.len(),
            "recomputed active view"
        );

        Self {
            total: table.len(),
            active: view.len(),
            yearly: toggles.trend.then(|| aggregate::yearly_counts(view)),
            triggers: toggles.triggers.then(|| aggregate::trigger_distribution(view)),
            fatalities: toggles.fatalities.then(|| aggregate::fatalities_per_year(view)),
            sizes: toggles.sizes.then(|| aggregate::size_distribution(view)),
            points: toggles.map.then(|| aggregate::map_points(view)),
            options: filtered.options,
        }
    }

    /// Render, resetting selections the option lists no longer offer first
    pub fn render_reconciled(
        table: &Table,
        selectors: &mut Selectors,
        toggles: &ChartToggles,
    ) -> Self {
        // Each pass can only clear selections, so this settles quickly
        for _ in 0..3 {
            let options = filter::apply(table, selectors).options;
            if !selectors.reconcile(&options) {
                break;
            }
        }
        Self::render(table, selectors, toggles)
    }

    pub fn is_empty(&self) -> bool {
        self.active == 0
    }
}
