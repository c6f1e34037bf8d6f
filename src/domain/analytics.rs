//! Click aggregation: time-bucketed series, country summaries and unique visits.
//!
//! All bucket arithmetic happens on the UTC calendar. Stored click timestamps
//! are truncated with [`Granularity::truncate`], never with formatted strings,
//! so grouping keys are immune to locale and DST drift.

use chrono::{DateTime, Datelike, Duration, NaiveTime, Timelike, Utc};
use serde::Serialize;
use serde_json::json;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::domain::entities::ClickWithGeo;
use crate::error::AppError;

/// Hours after which a repeated `(ip, user_agent)` pair counts as a new visit.
pub const UNIQUE_VISIT_WINDOW_HOURS: i64 = 12;

/// Bucket width selector for click reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Minute,
    Hour,
    Day,
    Week,
    Month,
}

impl Granularity {
    pub const ALL: [Granularity; 5] = [
        Granularity::Minute,
        Granularity::Hour,
        Granularity::Day,
        Granularity::Week,
        Granularity::Month,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Granularity::Minute => "minute",
            Granularity::Hour => "hour",
            Granularity::Day => "day",
            Granularity::Week => "week",
            Granularity::Month => "month",
        }
    }

    /// Number of buckets in a series of this granularity.
    ///
    /// The current (partial) bucket is always included.
    pub fn bucket_count(self) -> usize {
        match self {
            Granularity::Minute => 60,
            Granularity::Hour => 45,
            Granularity::Day => 44,
            Granularity::Week => 7,
            Granularity::Month => 1,
        }
    }

    /// Truncates a timestamp to the start of its bucket.
    ///
    /// Weeks start on Monday 00:00 UTC, months on the 1st at 00:00 UTC.
    pub fn truncate(self, ts: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            Granularity::Minute => {
                ts - Duration::seconds(i64::from(ts.second()))
                    - Duration::nanoseconds(i64::from(ts.nanosecond()))
            }
            Granularity::Hour => {
                let minute = Granularity::Minute.truncate(ts);
                minute - Duration::minutes(i64::from(minute.minute()))
            }
            Granularity::Day => ts.date_naive().and_time(NaiveTime::MIN).and_utc(),
            Granularity::Week => {
                let day = Granularity::Day.truncate(ts);
                day - Duration::days(i64::from(day.weekday().num_days_from_monday()))
            }
            Granularity::Month => {
                let day = Granularity::Day.truncate(ts);
                day - Duration::days(i64::from(day.day() - 1))
            }
        }
    }

    /// Bucket starts of the series ending at `now`, newest first.
    pub fn bucket_starts(self, now: DateTime<Utc>) -> Vec<DateTime<Utc>> {
        let step = match self {
            Granularity::Minute => Duration::minutes(1),
            Granularity::Hour => Duration::hours(1),
            Granularity::Day => Duration::days(1),
            Granularity::Week => Duration::weeks(1),
            // single bucket, never stepped
            Granularity::Month => Duration::zero(),
        };

        let newest = self.truncate(now);
        (0..self.bucket_count())
            .map(|i| newest - step * i as i32)
            .collect()
    }

    /// Query window `[start, end]` covering every bucket of the series.
    pub fn window(self, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        let starts = self.bucket_starts(now);
        let oldest = starts.last().copied().unwrap_or_else(|| self.truncate(now));
        (oldest, now)
    }

    /// Formats a bucket start as the label exposed in reports.
    pub fn format_label(self, bucket_start: DateTime<Utc>) -> String {
        let pattern = match self {
            Granularity::Minute => "%Y-%m-%dT%H:%M:00+0000",
            Granularity::Hour => "%Y-%m-%d %H:00:00",
            Granularity::Day | Granularity::Month => "%Y-%m-%d",
            Granularity::Week => "%Y-%m-%dT00:00:00+0000",
        };
        bucket_start.format(pattern).to_string()
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Granularity {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Granularity::ALL
            .into_iter()
            .find(|g| g.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                AppError::bad_request(
                    "Invalid unit specified",
                    json!({
                        "unit": s,
                        "allowed": Granularity::ALL.map(Granularity::as_str),
                    }),
                )
            })
    }
}

/// Click count for one bucket as returned by the store.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct BucketCount {
    pub bucket: DateTime<Utc>,
    pub clicks: i64,
}

/// One entry of a report series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesPoint {
    pub bucket_start: DateTime<Utc>,
    pub clicks: i64,
}

/// Fixed-length, zero-filled click series.
#[derive(Debug, Clone)]
pub struct Series {
    pub unit_reference: DateTime<Utc>,
    pub unit: Granularity,
    /// Newest bucket first.
    pub points: Vec<SeriesPoint>,
}

impl Series {
    pub fn units(&self) -> usize {
        self.points.len()
    }

    pub fn total(&self) -> i64 {
        self.points.iter().map(|p| p.clicks).sum()
    }
}

/// Builds the zero-filled series for `granularity` ending at `now`.
///
/// `rows` may be grouped at any granularity equal to or finer than the
/// requested one; rows are re-truncated before counting and rows outside
/// the series are ignored.
pub fn build_series(granularity: Granularity, now: DateTime<Utc>, rows: &[BucketCount]) -> Series {
    let mut by_bucket: HashMap<DateTime<Utc>, i64> = HashMap::with_capacity(rows.len());
    for row in rows {
        *by_bucket.entry(granularity.truncate(row.bucket)).or_default() += row.clicks;
    }

    let points = granularity
        .bucket_starts(now)
        .into_iter()
        .map(|bucket_start| SeriesPoint {
            bucket_start,
            clicks: by_bucket.get(&bucket_start).copied().unwrap_or(0),
        })
        .collect();

    Series {
        unit_reference: now,
        unit: granularity,
        points,
    }
}

/// Clicks attributed to one country.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountryCount {
    pub country: String,
    pub clicks: i64,
}

/// Per-country click totals for a link.
#[derive(Debug, Clone)]
pub struct CountrySummary {
    pub unit_reference: DateTime<Utc>,
    /// Sorted by clicks descending, then country code.
    pub metrics: Vec<CountryCount>,
    /// All clicks considered, including those without geolocation.
    pub units: usize,
}

/// Counts clicks per country. Clicks without a known country are skipped
/// from the buckets but still counted in `units`.
pub fn summarize_countries(clicks: &[ClickWithGeo], now: DateTime<Utc>) -> CountrySummary {
    let mut by_country: HashMap<&str, i64> = HashMap::new();

    for entry in clicks {
        let country = entry
            .geo
            .as_ref()
            .and_then(|g| g.country.as_deref())
            .filter(|c| !c.is_empty());

        if let Some(country) = country {
            *by_country.entry(country).or_default() += 1;
        }
    }

    let mut metrics: Vec<CountryCount> = by_country
        .into_iter()
        .map(|(country, clicks)| CountryCount {
            country: country.to_string(),
            clicks,
        })
        .collect();
    metrics.sort_by(|a, b| b.clicks.cmp(&a.clicks).then_with(|| a.country.cmp(&b.country)));

    CountrySummary {
        unit_reference: now,
        metrics,
        units: clicks.len(),
    }
}

/// Collapses repeated visits of the same `(ip, user_agent)` pair.
///
/// Clicks are walked in timestamp order. A pair is emitted on first sight and
/// again only once a click lands more than [`UNIQUE_VISIT_WINDOW_HOURS`]
/// after the last *emitted* click of that pair.
pub fn unique_visits(mut clicks: Vec<ClickWithGeo>) -> Vec<ClickWithGeo> {
    clicks.sort_by_key(|c| (c.click.clicked_at, c.click.id));

    let window = Duration::hours(UNIQUE_VISIT_WINDOW_HOURS);
    let mut last_emitted: HashMap<(String, String), DateTime<Utc>> = HashMap::new();
    let mut unique = Vec::new();

    for entry in clicks {
        let key = (entry.click.ip.clone(), entry.click.user_agent.clone());
        let at = entry.click.clicked_at;

        let qualifies = match last_emitted.get(&key) {
            None => true,
            Some(previous) => at > *previous + window,
        };

        if qualifies {
            last_emitted.insert(key, at);
            unique.push(entry);
        }
    }

    unique
}
