use crate::filter::View;
use std::collections::{BTreeMap, HashMap};

/// Number of events in one year
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct YearCount {
    pub year: i32,
    pub count: usize,
}

/// Total fatalities in one year
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct YearFatalities {
    pub year: i32,
    pub fatalities: u64,
}

/// Count of one category value
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tally {
    pub label: String,
    pub count: usize,
}

/// An event placed on the map
#[derive(Clone, Debug, PartialEq)]
pub struct MapPoint {
    pub lat: f64,
    pub lon: f64,
    pub title: String,
    pub country: Option<String>,
    pub trigger: Option<String>,
    pub fatalities: u64,
}

/// Events per year, ascending
pub fn yearly_counts(view: &View) -> Vec<YearCount> {
    let mut years: BTreeMap<i32, usize> = BTreeMap::new();
    for r in view.rows() {
        *years.entry(r.year).or_default() += 1;
    }
    years
        .into_iter()
        .map(|(year, count)| YearCount { year, count })
        .collect()
}

/// Fatalities summed per year, ascending
pub fn fatalities_per_year(view: &View) -> Vec<YearFatalities> {
    let mut years: BTreeMap<i32, u64> = BTreeMap::new();
    for r in view.rows() {
        let total = years.entry(r.year).or_default();
        *total = total.saturating_add(r.fatality_count);
    }
    years
        .into_iter()
        .map(|(year, fatalities)| YearFatalities { year, fatalities })
        .collect()
}

/// Events per trigger, most frequent first
pub fn trigger_distribution(view: &View) -> Vec<Tally> {
    value_counts(view.rows().iter().map(|r| r.landslide_trigger.as_deref()))
}

/// Events per size class, most frequent first
pub fn size_distribution(view: &View) -> Vec<Tally> {
    value_counts(view.rows().iter().map(|r| r.landslide_size.as_deref()))
}

/// Every plottable event; rows lacking a coordinate are skipped
pub fn map_points(view: &View) -> Vec<MapPoint> {
    view.rows()
        .iter()
        .filter_map(|r| {
            Some(MapPoint {
                lat: r.latitude?,
                lon: r.longitude?,
                title: r.event_title.clone(),
                country: r.country_name.clone(),
                trigger: r.landslide_trigger.clone(),
                fatalities: r.fatality_count,
            })
        })
        .collect()
}

/// Count non-null values, sorted by descending count. The sort is stable so
/// ties keep first-seen order.
fn value_counts<'a>(values: impl Iterator<Item = Option<&'a str>>) -> Vec<Tally> {
    let mut slots: HashMap<&str, usize> = HashMap::new();
    let mut tallies: Vec<Tally> = Vec::new();

    for value in values.flatten() {
        let slot = *slots.entry(value).or_insert_with(|| {
            tallies.push(Tally {
                label: value.to_string(),
                count: 0,
            });
            tallies.len() - 1
        });
        tallies[slot].count += 1;
    }

    tallies.sort_by(|a, b| b.count.cmp(&a.count));
    tallies
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::tests::{event, sample_table};
    use crate::filter::{FatalityFilter, YearRange};
    use crate::records::Table;

    fn tally(label: &str, count: usize) -> Tally {
        Tally {
            label: label.to_string(),
            count,
        }
    }

    #[test]
    fn test_three_record_example() {
        let t = Table::from_records(vec![
            event(2010, Some("A"), Some("rain"), Some("small"), 2),
            event(2010, Some("B"), Some("rain"), Some("small"), 0),
            event(2012, Some("A"), Some("earthquake"), Some("large"), 0),
        ]);
        let v = View::of(&t);

        assert_eq!(
            yearly_counts(&v),
            vec![YearCount { year: 2010, count: 2 }, YearCount { year: 2012, count: 1 }]
        );
        assert_eq!(
            fatalities_per_year(&v),
            vec![
                YearFatalities { year: 2010, fatalities: 2 },
                YearFatalities { year: 2012, fatalities: 0 },
            ]
        );
        assert_eq!(
            trigger_distribution(&v),
            vec![tally("rain", 2), tally("earthquake", 1)]
        );
    }

    #[test]
    fn test_yearly_domain_matches_range() {
        let t = sample_table();
        let present = [2008, 2010, 2011, 2013, 2015];
        for (a, b) in [(2008, 2015), (2009, 2012), (2011, 2011), (2012, 2012), (2000, 2009)] {
            let v = View::of(&t).by_years(YearRange::new(a, b));
            let domain: Vec<i32> = yearly_counts(&v).iter().map(|y| y.year).collect();
            let expected: Vec<i32> = present.iter().copied().filter(|y| (a..=b).contains(y)).collect();
            assert_eq!(domain, expected, "range {a}..={b}");
        }
    }

    #[test]
    fn test_fatality_sum_preserved() {
        let t = sample_table();
        for fatality in FatalityFilter::OPTIONS {
            let v = View::of(&t).by_fatality(fatality);
            let total: u64 = fatalities_per_year(&v).iter().map(|y| y.fatalities).sum();
            let expected: u64 = v.rows().iter().map(|r| r.fatality_count).sum();
            assert_eq!(total, expected);
        }
    }

    #[test]
    fn test_fatality_sum_saturates() {
        let t = Table::from_records(vec![
            event(2010, Some("A"), Some("rain"), None, u64::MAX - 1),
            event(2010, Some("B"), Some("rain"), None, 5),
        ]);
        let years = fatalities_per_year(&View::of(&t));
        assert_eq!(years, vec![YearFatalities { year: 2010, fatalities: u64::MAX }]);
    }

    #[test]
    fn test_ties_keep_first_seen_order() {
        let t = Table::from_records(vec![
            event(2001, None, Some("snowmelt"), Some("small"), 0),
            event(2001, None, Some("rain"), Some("large"), 0),
            event(2001, None, Some("rain"), Some("large"), 0),
            event(2001, None, Some("flood"), Some("small"), 0),
            event(2001, None, Some("snowmelt"), Some("medium"), 0),
        ]);
        let v = View::of(&t);
        assert_eq!(
            trigger_distribution(&v),
            vec![tally("snowmelt", 2), tally("rain", 2), tally("flood", 1)]
        );
        assert_eq!(
            size_distribution(&v),
            vec![tally("small", 2), tally("large", 2), tally("medium", 1)]
        );
    }

    #[test]
    fn test_nulls_not_counted() {
        let t = sample_table();
        let v = View::of(&t);
        let triggers: usize = trigger_distribution(&v).iter().map(|t| t.count).sum();
        let sizes: usize = size_distribution(&v).iter().map(|t| t.count).sum();
        assert_eq!(triggers, t.len() - 1);
        assert_eq!(sizes, t.len() - 1);
    }

    #[test]
    fn test_map_points_skip_missing_coordinates() {
        let mut no_coords = event(2005, Some("Chile"), Some("rain"), None, 4);
        no_coords.latitude = None;
        let t = Table::from_records(vec![no_coords, event(2006, Some("Chile"), None, None, 1)]);
        let points = map_points(&View::of(&t));
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].trigger, None);
        assert_eq!(points[0].fatalities, 1);
        assert_eq!(points[0].country.as_deref(), Some("Chile"));
    }

    #[test]
    fn test_empty_view() {
        let t = Table::default();
        let v = View::of(&t);
        assert!(yearly_counts(&v).is_empty());
        assert!(trigger_distribution(&v).is_empty());
        assert!(map_points(&v).is_empty());
    }
}
