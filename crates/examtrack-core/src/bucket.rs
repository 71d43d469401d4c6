//! Calendar bucketing for daily, weekly and monthly trend views.
//!
//! Keys are zero-padded ISO components, so sorting keys as strings sorts
//! buckets chronologically. Nothing here depends on the current date.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::model::Granularity;

/// A calendar period that records are grouped into.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Bucket {
    /// Sort-stable key: `YYYY-MM-DD` for days and weeks, `YYYY-MM` for months.
    pub key: String,
    /// Human-readable label.
    pub label: String,
    /// First day of the period.
    pub period_start: NaiveDate,
    /// Last day of the period, inclusive.
    pub period_end: NaiveDate,
}

impl Bucket {
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.period_start && date <= self.period_end
    }
}

/// Assign `date` to its bucket at the given granularity.
pub fn bucket_key(date: NaiveDate, granularity: Granularity) -> Bucket {
    match granularity {
        Granularity::Daily => Bucket {
            key: iso_day(date),
            label: date.format("%-d %B %Y").to_string(),
            period_start: date,
            period_end: date,
        },
        Granularity::Weekly => {
            let start = week_start(date);
            let end = start + Duration::days(6);
            Bucket {
                key: iso_day(start),
                label: format!(
                    "{}/{} – {}/{}",
                    start.day(),
                    start.month(),
                    end.day(),
                    end.month()
                ),
                period_start: start,
                period_end: end,
            }
        }
        Granularity::Monthly => {
            let start = month_start(date);
            Bucket {
                key: start.format("%Y-%m").to_string(),
                label: start.format("%B %Y").to_string(),
                period_start: start,
                period_end: month_end(start),
            }
        }
    }
}

/// Monday on or before `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// First day of the month containing `date`.
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

fn month_end(start: NaiveDate) -> NaiveDate {
    let next = if start.month() == 12 {
        NaiveDate::from_ymd_opt(start.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(start.year(), start.month() + 1, 1)
    };
    next.and_then(|d| d.pred_opt()).unwrap_or(start)
}

fn iso_day(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Distinct buckets covering `dates`, newest first.
pub fn available_periods<I>(dates: I, granularity: Granularity) -> Vec<Bucket>
where
    I: IntoIterator<Item = NaiveDate>,
{
    let mut seen: BTreeMap<String, Bucket> = BTreeMap::new();
    for date in dates {
        let bucket = bucket_key(date, granularity);
        seen.entry(bucket.key.clone()).or_insert(bucket);
    }
    seen.into_values().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn whole_week_maps_to_monday() {
        let days = [
            "2024-03-04",
            "2024-03-05",
            "2024-03-06",
            "2024-03-07",
            "2024-03-08",
            "2024-03-09",
            "2024-03-10",
        ];
        for day in days {
            let bucket = bucket_key(date(day), Granularity::Weekly);
            assert_eq!(bucket.key, "2024-03-04", "{day}");
            assert_eq!(bucket.label, "4/3 – 10/3");
            assert_eq!(bucket.period_end, date("2024-03-10"));
        }
        assert_eq!(
            bucket_key(date("2024-03-11"), Granularity::Weekly).key,
            "2024-03-11"
        );
    }

    #[test]
    fn week_crossing_month_and_year() {
        let bucket = bucket_key(date("2025-01-01"), Granularity::Weekly);
        assert_eq!(bucket.key, "2024-12-30");
        assert_eq!(bucket.label, "30/12 – 5/1");
    }

    #[test]
    fn bucket_contains_its_period_inclusive() {
        let week = bucket_key(date("2024-03-01"), Granularity::Weekly);
        assert!(week.contains(date("2024-02-26")));
        assert!(week.contains(date("2024-03-03")));
        assert!(!week.contains(date("2024-03-04")));

        let march = bucket_key(date("2024-03-15"), Granularity::Monthly);
        assert!(march.contains(date("2024-03-31")));
        assert!(!march.contains(week.period_start));
    }

    #[test]
    fn daily_and_monthly_keys() {
        let daily = bucket_key(date("2024-03-09"), Granularity::Daily);
        assert_eq!(daily.key, "2024-03-09");
        assert_eq!(daily.label, "9 March 2024");

        let monthly = bucket_key(date("2024-02-17"), Granularity::Monthly);
        assert_eq!(monthly.key, "2024-02");
        assert_eq!(monthly.label, "February 2024");
        assert_eq!(monthly.period_start, date("2024-02-01"));
        assert_eq!(monthly.period_end, date("2024-02-29"));

        let december = bucket_key(date("2023-12-31"), Granularity::Monthly);
        assert_eq!(december.period_end, date("2023-12-31"));
    }

    #[test]
    fn bucketing_is_deterministic() {
        let d = date("2024-07-21");
        for granularity in [Granularity::Daily, Granularity::Weekly, Granularity::Monthly] {
            assert_eq!(bucket_key(d, granularity), bucket_key(d, granularity));
        }
    }

    #[test]
    fn keys_sort_chronologically() {
        let dates = [
            "2023-12-31",
            "2024-01-01",
            "2024-01-09",
            "2024-02-28",
            "2024-10-02",
            "2025-01-05",
        ];
        for granularity in [Granularity::Daily, Granularity::Weekly, Granularity::Monthly] {
            let keys: Vec<String> = dates
                .iter()
                .map(|d| bucket_key(date(d), granularity).key)
                .collect();
            let mut sorted = keys.clone();
            sorted.sort();
            assert_eq!(keys, sorted, "{granularity}");
        }
    }

    #[test]
    fn available_periods_newest_first() {
        let dates = ["2024-03-04", "2024-01-15", "2024-03-20", "2024-01-02"].map(date);
        let months = available_periods(dates, Granularity::Monthly);
        let keys: Vec<&str> = months.iter().map(|b| b.key.as_str()).collect();
        assert_eq!(keys, vec!["2024-03", "2024-01"]);
    }
}
