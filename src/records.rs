use crate::error::LoadError;
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// Columns the loader requires in the CSV header
pub const REQUIRED_COLUMNS: [&str; 8] = [
    "event_date",
    "country_name",
    "landslide_trigger",
    "landslide_size",
    "fatality_count",
    "latitude",
    "longitude",
    "event_title",
];

/// Date-only layouts tried in order (slash dates are month-first)
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// Date-time layouts tried in order
const DATETIME_FORMATS: [&str; 9] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %I:%M:%S %p",
];

/// One landslide event
#[derive(Clone, Debug, PartialEq)]
pub struct EventRecord {
    pub event_date: NaiveDate,
    pub year: i32,
    pub country_name: Option<String>,
    pub landslide_trigger: Option<String>,
    pub landslide_size: Option<String>,
    pub fatality_count: u64,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub event_title: String,
}

/// Immutable table of events loaded once per run
#[derive(Clone, Debug, Default)]
pub struct Table {
    records: Vec<EventRecord>,
    dropped: usize,
}

impl Table {
    /// Build a table from already-typed records
    pub fn from_records(records: Vec<EventRecord>) -> Self {
        Self { records, dropped: 0 }
    }

    /// Load a CSV file from disk
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let file = File::open(path).map_err(|source| LoadError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let table = Self::from_reader(file)?;
        info!(
            path = %path.display(),
            rows = table.len(),
            dropped = table.dropped,
            "loaded event table"
        );
        Ok(table)
    }

    /// Parse CSV from any reader. Rows without a parsable `event_date` are dropped.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, LoadError> {
        let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
        let columns = ColumnIndex::from_headers(rdr.headers()?)?;

        let mut records = Vec::new();
        let mut dropped = 0;

        for row in rdr.records() {
            let row = row?;
            match columns.parse_row(&row) {
                Some(record) => records.push(record),
                None => dropped += 1,
            }
        }

        if dropped > 0 {
            debug!(dropped, "dropped rows with missing or unparsable event_date");
        }

        Ok(Self { records, dropped })
    }

    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Rows excluded at load because their date could not be parsed
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Smallest and largest observed year
    pub fn year_bounds(&self) -> Option<(i32, i32)> {
        let mut years = self.records.iter().map(|r| r.year);
        let first = years.next()?;
        Some(years.fold((first, first), |(lo, hi), y| (lo.min(y), hi.max(y))))
    }
}

/// Header positions of the required columns
struct ColumnIndex {
    event_date: usize,
    country_name: usize,
    landslide_trigger: usize,
    landslide_size: usize,
    fatality_count: usize,
    latitude: usize,
    longitude: usize,
    event_title: usize,
}

impl ColumnIndex {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self, LoadError> {
        let find = |name: &str| headers.iter().position(|h| h.trim() == name);

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|name| find(name).is_none())
            .map(|name| name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(LoadError::MissingColumns(missing));
        }

        let at = |name: &str| find(name).unwrap_or_default();
        Ok(Self {
            event_date: at("event_date"),
            country_name: at("country_name"),
            landslide_trigger: at("landslide_trigger"),
            landslide_size: at("landslide_size"),
            fatality_count: at("fatality_count"),
            latitude: at("latitude"),
            longitude: at("longitude"),
            event_title: at("event_title"),
        })
    }

    fn parse_row(&self, row: &csv::StringRecord) -> Option<EventRecord> {
        let field = |idx: usize| row.get(idx).map(str::trim).filter(|s| !s.is_empty());

        let event_date = field(self.event_date).and_then(parse_event_date)?;

        Some(EventRecord {
            event_date,
            year: event_date.year(),
            country_name: field(self.country_name).map(str::to_string),
            landslide_trigger: field(self.landslide_trigger).map(str::to_string),
            landslide_size: field(self.landslide_size).map(str::to_string),
            fatality_count: field(self.fatality_count).map_or(0, parse_fatalities),
            latitude: field(self.latitude).and_then(parse_coordinate),
            longitude: field(self.longitude).and_then(parse_coordinate),
            event_title: field(self.event_title).unwrap_or_default().to_string(),
        })
    }
}

/// Permissive date parser; anything unrecognised is `None`
pub fn parse_event_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt.date());
        }
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .or_else(|| parse_partial_date(raw))
}

/// "YYYY-MM" and "YYYY" resolve to the first day of the period
fn parse_partial_date(raw: &str) -> Option<NaiveDate> {
    let mut parts = raw.splitn(2, ['-', '/']);
    let year = parts.next().filter(|y| y.len() == 4)?.parse().ok()?;
    let month = match parts.next() {
        Some(m) if (1..=2).contains(&m.len()) => m.parse().ok()?,
        Some(_) => return None,
        None => 1,
    };
    NaiveDate::from_ymd_opt(year, month, 1)
}

/// Upper bound on a single event's fatality count
pub const MAX_FATALITIES: u64 = u32::MAX as u64;

/// Fatality counts may arrive as floats ("2.0"); negatives clamp to zero and
/// absurd values clamp to `MAX_FATALITIES`
fn parse_fatalities(raw: &str) -> u64 {
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() && v > 0.0 => (v.round() as u64).min(MAX_FATALITIES),
        _ => 0,
    }
}

fn parse_coordinate(raw: &str) -> Option<f64> {
    raw.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const HEADER: &str =
        "event_title,event_date,country_name,landslide_trigger,landslide_size,fatality_count,latitude,longitude,source\n";

    fn table(body: &str) -> Table {
        Table::from_reader(format!("{HEADER}{body}").as_bytes()).unwrap()
    }

    #[test]
    fn test_parse_date_formats() {
        let d = NaiveDate::from_ymd_opt(2007, 6, 4).unwrap();
        assert_eq!(parse_event_date("2007-06-04"), Some(d));
        assert_eq!(parse_event_date("06/04/2007 12:00:00 AM"), Some(d));
        assert_eq!(parse_event_date("06/04/2007 22:15"), Some(d));
        assert_eq!(parse_event_date("2007-06-04T10:30:00.000"), Some(d));
        assert_eq!(parse_event_date("2007-06-04T10:30:00Z"), Some(d));
        assert_eq!(parse_event_date("2007/06/04"), Some(d));
        assert_eq!(parse_event_date("2007/06/04 10:30:00"), Some(d));
        assert_eq!(parse_event_date("2007/06/04 10:30"), Some(d));
        assert_eq!(parse_event_date("2007-06-04 10:30"), Some(d));
        assert_eq!(parse_event_date("2007-06"), NaiveDate::from_ymd_opt(2007, 6, 1));
        assert_eq!(parse_event_date("2007"), NaiveDate::from_ymd_opt(2007, 1, 1));
        assert_eq!(parse_event_date("2007-13"), None);
        assert_eq!(parse_event_date("not a date"), None);
        assert_eq!(parse_event_date("13/45/2007"), None);
    }

    #[test]
    fn test_unparsable_dates_are_dropped() {
        let t = table(
            "A,2010-01-02,Nepal,rain,small,2,27.7,85.3,x\n\
             B,garbage,Nepal,rain,small,1,27.7,85.3,x\n\
             C,,Peru,mudslide,large,0,-12.0,-77.0,x\n",
        );
        assert_eq!(t.len(), 1);
        assert_eq!(t.dropped(), 2);
        assert_eq!(t.records()[0].event_title, "A");
        assert_eq!(t.records()[0].year, 2010);
    }

    #[test]
    fn test_optional_fields_and_fatalities() {
        let t = table(
            "A,2010-01-02,,,,,,,x\n\
             B,2011-01-02,Chile,rain,medium,3.0,-33.4,-70.6,x\n\
             C,2012-01-02,Chile,rain,medium,-4,abc,-70.6,x\n",
        );
        let r = t.records();
        assert_eq!(r[0].country_name, None);
        assert_eq!(r[0].landslide_trigger, None);
        assert_eq!(r[0].fatality_count, 0);
        assert_eq!(r[0].latitude, None);
        assert_eq!(r[1].fatality_count, 3);
        assert_eq!(r[1].latitude, Some(-33.4));
        assert_eq!(r[2].fatality_count, 0);
        assert_eq!(r[2].latitude, None);
        assert_eq!(r[2].longitude, Some(-70.6));
    }

    #[test]
    fn test_huge_fatalities_are_capped() {
        let t = table(
            "A,2010-01-02,Nepal,rain,small,1e19,27.7,85.3,x\n\
             B,2010-03-02,Nepal,rain,small,1e19,27.7,85.3,x\n",
        );
        assert!(t.records().iter().all(|r| r.fatality_count == MAX_FATALITIES));
        let sum: u64 = t.records().iter().map(|r| r.fatality_count).sum();
        assert_eq!(sum, 2 * MAX_FATALITIES);
    }

    #[test]
    fn test_missing_columns_rejected() {
        let err = Table::from_reader("event_date,country_name\n2010-01-01,Nepal\n".as_bytes())
            .unwrap_err();
        match err {
            LoadError::MissingColumns(cols) => {
                assert!(cols.contains(&"landslide_trigger".to_string()));
                assert!(cols.contains(&"event_title".to_string()));
                assert!(!cols.contains(&"event_date".to_string()));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_year_bounds() {
        assert_eq!(Table::default().year_bounds(), None);
        let t = table(
            "A,2015-01-02,Nepal,rain,small,0,1,1,x\n\
             B,2003-01-02,Nepal,rain,small,0,1,1,x\n\
             C,2009-01-02,Nepal,rain,small,0,1,1,x\n",
        );
        assert_eq!(t.year_bounds(), Some((2003, 2015)));
    }

    #[test]
    fn test_load_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{HEADER}A,2010-01-02,Nepal,rain,small,2,27.7,85.3,x\n").unwrap();
        let t = Table::load(file.path()).unwrap();
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn test_load_missing_file() {
        let err = Table::load(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, LoadError::Open { .. }));
    }
}
