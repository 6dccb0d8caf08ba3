//! Time-series bucket synthesis
//!
//! Series are skeleton-first: the full ordered list of bucket starts
//! is derived from the range alone, then observed rows are overlaid by
//! truncating each event timestamp to its bucket. Buckets without rows
//! stay at zero, so a series always holds exactly `bucket_count`
//! entries regardless of how sparse the underlying data is.

use crate::range::{midnight, month_start, Granularity, RangeSelector};
use chrono::{DateTime, Duration, Months, Utc};
use conftrack_model::{EventKind, TelemetryEvent};
use serde::Serialize;
use std::collections::HashMap;

/// Page views in one bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewBucket {
    pub bucket_start: DateTime<Utc>,
    pub views: u64,
}

/// Per-kind interaction counts in one bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventBucket {
    pub bucket_start: DateTime<Utc>,
    pub page_views: u64,
    pub downloads: u64,
    pub form_submits: u64,
    pub other: u64,
    /// Sum of the four kind counts.
    pub total: u64,
}

#[derive(Debug, Default, Clone, Copy)]
struct KindCounts {
    page_views: u64,
    downloads: u64,
    form_submits: u64,
    other: u64,
}

/// Ordered bucket starts for the range, oldest first.
#[must_use]
pub fn skeleton(range: RangeSelector, now: DateTime<Utc>) -> Vec<DateTime<Utc>> {
    let start = range.window_start(now);
    let count = range.bucket_count();
    let mut starts = Vec::with_capacity(count);
    for step in 0..count {
        let bucket = match range.granularity() {
            Granularity::Day => start + Duration::days(step as i64),
            Granularity::Week => start + Duration::days(7 * step as i64),
            Granularity::Month => start
                .checked_add_months(Months::new(step as u32))
                .unwrap_or(start),
        };
        starts.push(bucket);
    }
    starts
}

/// Truncate an event timestamp to the start of its bucket.
///
/// Timestamps before `window_start` truncate to a start that is not in
/// the skeleton and therefore never show up in a series.
#[must_use]
pub fn bucket_of(
    timestamp: DateTime<Utc>,
    range: RangeSelector,
    window_start: DateTime<Utc>,
) -> DateTime<Utc> {
    match range.granularity() {
        Granularity::Day => midnight(timestamp),
        Granularity::Week => {
            let steps = (timestamp - window_start).num_days().div_euclid(7);
            window_start + Duration::days(7 * steps)
        }
        Granularity::Month => month_start(timestamp),
    }
}

/// Page-view series: skeleton overlaid with observed page-view rows.
#[must_use]
pub fn view_series(
    range: RangeSelector,
    now: DateTime<Utc>,
    events: &[TelemetryEvent],
) -> Vec<ViewBucket> {
    let window_start = range.window_start(now);
    let mut counts: HashMap<DateTime<Utc>, u64> = HashMap::new();
    for event in events.iter().filter(|e| e.kind == EventKind::PageView) {
        *counts
            .entry(bucket_of(event.timestamp, range, window_start))
            .or_insert(0) += 1;
    }

    skeleton(range, now)
        .into_iter()
        .map(|bucket_start| ViewBucket {
            bucket_start,
            views: counts.get(&bucket_start).copied().unwrap_or(0),
        })
        .collect()
}

/// All-kinds series: skeleton overlaid with every observed row.
#[must_use]
pub fn event_series(
    range: RangeSelector,
    now: DateTime<Utc>,
    events: &[TelemetryEvent],
) -> Vec<EventBucket> {
    let window_start = range.window_start(now);
    let mut counts: HashMap<DateTime<Utc>, KindCounts> = HashMap::new();
    for event in events {
        let slot = counts
            .entry(bucket_of(event.timestamp, range, window_start))
            .or_default();
        match event.kind {
            EventKind::PageView => slot.page_views += 1,
            EventKind::Download => slot.downloads += 1,
            EventKind::FormSubmit => slot.form_submits += 1,
            EventKind::Other => slot.other += 1,
        }
    }

    skeleton(range, now)
        .into_iter()
        .map(|bucket_start| {
            let c = counts.get(&bucket_start).copied().unwrap_or_default();
            EventBucket {
                bucket_start,
                page_views: c.page_views,
                downloads: c.downloads,
                form_submits: c.form_submits,
                other: c.other,
                total: c.page_views + c.downloads + c.form_submits + c.other,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use uuid::Uuid;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn event(kind: EventKind, timestamp: DateTime<Utc>) -> TelemetryEvent {
        TelemetryEvent {
            id: Uuid::new_v4(),
            kind,
            path: None,
            session_id: None,
            timestamp,
        }
    }

    #[test]
    fn skeleton_is_dense_and_ordered() {
        let now = at(2025, 6, 20, 15);
        for range in [
            RangeSelector::SevenDays,
            RangeSelector::FourteenDays,
            RangeSelector::ThirtyDays,
            RangeSelector::ThreeMonths,
            RangeSelector::OneYear,
        ] {
            let starts = skeleton(range, now);
            assert_eq!(starts.len(), range.bucket_count(), "{range}");
            assert!(starts.windows(2).all(|w| w[0] < w[1]), "{range}");
            assert_eq!(starts[0], range.window_start(now), "{range}");
        }
    }

    #[test]
    fn sparse_rows_still_yield_full_series() {
        // Two days of traffic inside a 14-day window.
        let now = at(2025, 6, 20, 15);
        let events = vec![
            event(EventKind::PageView, at(2025, 6, 10, 9)),
            event(EventKind::PageView, at(2025, 6, 10, 17)),
            event(EventKind::PageView, at(2025, 6, 18, 3)),
        ];

        let series = view_series(RangeSelector::FourteenDays, now, &events);
        assert_eq!(series.len(), 14);
        assert_eq!(series.iter().filter(|b| b.views == 0).count(), 12);
        assert_eq!(series.iter().map(|b| b.views).sum::<u64>(), 3);
        let tenth = series.iter().find(|b| b.bucket_start == at(2025, 6, 10, 0));
        assert_eq!(tenth.map(|b| b.views), Some(2));
    }

    #[test]
    fn weekly_truncation_aligns_to_window_start() {
        let now = at(2025, 6, 20, 15);
        let range = RangeSelector::ThreeMonths;
        let window_start = range.window_start(now);

        // Ten days in lands inside the second 7-day step.
        let ts = window_start + Duration::days(10);
        assert_eq!(bucket_of(ts, range, window_start), window_start + Duration::days(7));
        // First instant of the window is its own bucket.
        assert_eq!(bucket_of(window_start, range, window_start), window_start);
    }

    #[test]
    fn monthly_skeleton_crosses_year_boundary() {
        let starts = skeleton(RangeSelector::OneYear, at(2025, 3, 10, 12));
        assert_eq!(starts.first().copied(), Some(at(2024, 4, 1, 0)));
        assert_eq!(starts.last().copied(), Some(at(2025, 3, 1, 0)));
        assert_eq!(starts.len(), 12);
    }

    #[test]
    fn pre_window_rows_never_count() {
        let now = at(2025, 6, 20, 15);
        let events = vec![event(EventKind::PageView, at(2025, 6, 1, 0))];
        let series = view_series(RangeSelector::SevenDays, now, &events);
        assert_eq!(series.iter().map(|b| b.views).sum::<u64>(), 0);
    }

    #[test]
    fn event_series_splits_by_kind_and_totals() {
        let now = at(2025, 6, 20, 15);
        let day = at(2025, 6, 19, 8);
        let events = vec![
            event(EventKind::PageView, day),
            event(EventKind::Download, day),
            event(EventKind::Download, day),
            event(EventKind::FormSubmit, day),
            event(EventKind::Other, day),
        ];

        let series = event_series(RangeSelector::SevenDays, now, &events);
        let bucket = series
            .iter()
            .find(|b| b.bucket_start == at(2025, 6, 19, 0))
            .unwrap();
        assert_eq!(bucket.page_views, 1);
        assert_eq!(bucket.downloads, 2);
        assert_eq!(bucket.form_submits, 1);
        assert_eq!(bucket.other, 1);
        assert_eq!(bucket.total, 5);
    }

    proptest! {
        /// However sparse the rows, a series is dense, ordered and
        /// accounts for every in-window event exactly once.
        #[test]
        fn series_are_gap_free(offsets in proptest::collection::vec(0i64..30 * 24 * 60, 0..40)) {
            let now = at(2025, 6, 20, 15);
            let range = RangeSelector::ThirtyDays;
            let window_start = range.window_start(now);
            let events: Vec<TelemetryEvent> = offsets
                .iter()
                .map(|minutes| event(EventKind::PageView, window_start + Duration::minutes(*minutes)))
                .collect();

            let series = view_series(range, now, &events);
            prop_assert_eq!(series.len(), range.bucket_count());
            prop_assert!(series.windows(2).all(|w| w[0].bucket_start < w[1].bucket_start));
            prop_assert_eq!(series.iter().map(|b| b.views).sum::<u64>(), events.len() as u64);
        }
    }
}
