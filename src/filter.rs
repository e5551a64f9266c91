use crate::records::{EventRecord, Table};
use std::collections::BTreeSet;
use std::fmt;

/// Selector value meaning "no filtering on this dimension"
pub const ALL: &str = "All";

/// Inclusive year range
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct YearRange {
    pub min: i32,
    pub max: i32,
}

impl YearRange {
    pub fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }

    #[inline(always)]
    pub fn contains(&self, year: i32) -> bool {
        self.min <= year && year <= self.max
    }
}

/// Single-select country dropdown
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum CountrySelector {
    #[default]
    All,
    Only(String),
}

impl CountrySelector {
    /// Parse a dropdown label; the "All" sentinel maps to `All`
    pub fn from_label(label: &str) -> Self {
        if label == ALL {
            CountrySelector::All
        } else {
            CountrySelector::Only(label.to_string())
        }
    }

    pub fn label(&self) -> &str {
        match self {
            CountrySelector::All => ALL,
            CountrySelector::Only(name) => name,
        }
    }
}

/// Multi-select over triggers. Holding the "All" sentinel disables filtering.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TriggerSelection {
    include_all: bool,
    triggers: BTreeSet<String>,
}

impl Default for TriggerSelection {
    fn default() -> Self {
        Self::all()
    }
}

impl TriggerSelection {
    pub fn all() -> Self {
        Self {
            include_all: true,
            triggers: BTreeSet::new(),
        }
    }

    /// Build from selected labels; an "All" label selects the sentinel
    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut selection = Self {
            include_all: false,
            triggers: BTreeSet::new(),
        };
        for label in labels {
            selection.insert(label.as_ref());
        }
        selection
    }

    pub fn includes_all(&self) -> bool {
        self.include_all
    }

    pub fn contains(&self, label: &str) -> bool {
        if label == ALL {
            self.include_all
        } else {
            self.triggers.contains(label)
        }
    }

    pub fn insert(&mut self, label: &str) {
        if label == ALL {
            self.include_all = true;
        } else {
            self.triggers.insert(label.to_string());
        }
    }

    /// Flip membership of one label
    pub fn toggle(&mut self, label: &str) {
        if label == ALL {
            self.include_all = !self.include_all;
        } else if !self.triggers.remove(label) {
            self.triggers.insert(label.to_string());
        }
    }

    pub fn is_empty(&self) -> bool {
        !self.include_all && self.triggers.is_empty()
    }

    pub fn triggers(&self) -> impl Iterator<Item = &str> {
        self.triggers.iter().map(String::as_str)
    }

    fn matches(&self, trigger: Option<&str>) -> bool {
        self.include_all || trigger.is_some_and(|t| self.triggers.contains(t))
    }
}

/// Radio group over fatality status
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum FatalityFilter {
    #[default]
    All,
    FatalOnly,
    NonFatalOnly,
}

impl FatalityFilter {
    pub const OPTIONS: [FatalityFilter; 3] = [
        FatalityFilter::All,
        FatalityFilter::FatalOnly,
        FatalityFilter::NonFatalOnly,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FatalityFilter::All => ALL,
            FatalityFilter::FatalOnly => "Fatal only",
            FatalityFilter::NonFatalOnly => "Non-fatal only",
        }
    }

    #[inline(always)]
    fn matches(self, fatality_count: u64) -> bool {
        match self {
            FatalityFilter::All => true,
            FatalityFilter::FatalOnly => fatality_count > 0,
            FatalityFilter::NonFatalOnly => fatality_count == 0,
        }
    }
}

impl fmt::Display for FatalityFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Full selector state driving the active view
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selectors {
    /// `None` means the table's full observed range
    pub years: Option<YearRange>,
    pub country: CountrySelector,
    pub triggers: TriggerSelection,
    pub fatality: FatalityFilter,
}

impl Selectors {
    /// Defaults for a table: full year range, everything else "All"
    pub fn defaults_for(table: &Table) -> Self {
        Self {
            years: table.year_bounds().map(|(lo, hi)| YearRange::new(lo, hi)),
            ..Self::default()
        }
    }

    /// Drop selections that the cascading option lists no longer offer.
    /// Returns true if anything changed.
    pub fn reconcile(&mut self, options: &FilterOptions) -> bool {
        let mut changed = false;

        if let CountrySelector::Only(name) = &self.country {
            if !options.countries.iter().any(|c| c == name) {
                self.country = CountrySelector::All;
                changed = true;
            }
        }

        let before = self.triggers.triggers.len();
        self.triggers
            .triggers
            .retain(|t| options.triggers.iter().any(|o| o == t));
        if self.triggers.triggers.len() != before {
            changed = true;
            if self.triggers.is_empty() {
                self.triggers = TriggerSelection::all();
            }
        }

        changed
    }
}

/// Borrowed subset of table rows. Filtering builds a new view and never
/// touches the table.
#[derive(Clone, Debug)]
pub struct View<'a> {
    rows: Vec<&'a EventRecord>,
}

impl<'a> View<'a> {
    pub fn of(table: &'a Table) -> Self {
        Self {
            rows: table.records().iter().collect(),
        }
    }

    pub fn rows(&self) -> &[&'a EventRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn retain<F>(&self, mut keep: F) -> Self
    where
        F: FnMut(&EventRecord) -> bool,
    {
        Self {
            rows: self.rows.iter().copied().filter(|r| keep(r)).collect(),
        }
    }

    pub fn by_years(&self, range: YearRange) -> Self {
        self.retain(|r| range.contains(r.year))
    }

    pub fn by_country(&self, country: &CountrySelector) -> Self {
        match country {
            CountrySelector::All => self.clone(),
            CountrySelector::Only(name) => {
                self.retain(|r| r.country_name.as_deref() == Some(name.as_str()))
            }
        }
    }

    pub fn by_triggers(&self, triggers: &TriggerSelection) -> Self {
        if triggers.includes_all() {
            return self.clone();
        }
        self.retain(|r| triggers.matches(r.landslide_trigger.as_deref()))
    }

    pub fn by_fatality(&self, fatality: FatalityFilter) -> Self {
        self.retain(|r| fatality.matches(r.fatality_count))
    }

    /// Sorted distinct non-null countries
    pub fn countries(&self) -> Vec<String> {
        distinct(self.rows.iter().filter_map(|r| r.country_name.as_deref()))
    }

    /// Sorted distinct non-null triggers
    pub fn triggers(&self) -> Vec<String> {
        distinct(self.rows.iter().filter_map(|r| r.landslide_trigger.as_deref()))
    }
}

fn distinct<'s>(values: impl Iterator<Item = &'s str>) -> Vec<String> {
    values
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Choices offered by the dropdowns, cascading from the earlier stages
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterOptions {
    /// Year bounds of the whole table (slider limits)
    pub year_bounds: Option<(i32, i32)>,
    /// Countries present after the year stage
    pub countries: Vec<String>,
    /// Triggers present after the country stage
    pub triggers: Vec<String>,
}

/// Result of running every filter stage
#[derive(Clone, Debug)]
pub struct Filtered<'a> {
    pub view: View<'a>,
    pub options: FilterOptions,
}

/// Apply the stages in order: year range, country, trigger set, fatality status
pub fn apply<'a>(table: &'a Table, selectors: &Selectors) -> Filtered<'a> {
    let base = View::of(table);
    let by_year = match selectors.years {
        Some(range) => base.by_years(range),
        None => base,
    };
    let countries = by_year.countries();

    let by_country = by_year.by_country(&selectors.country);
    let triggers = by_country.triggers();

    let view = by_country
        .by_triggers(&selectors.triggers)
        .by_fatality(selectors.fatality);

    Filtered {
        view,
        options: FilterOptions {
            year_bounds: table.year_bounds(),
            countries,
            triggers,
        },
    }
}
