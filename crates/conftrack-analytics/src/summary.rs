//! Dashboard summary aggregation
//!
//! One pass over the telemetry window feeds every figure on the
//! dashboard: the gap-filled view and event series, distinct-session
//! visitor count, per-path ranking and per-kind interaction totals.

use crate::buckets::{event_series, view_series, EventBucket, ViewBucket};
use crate::error::AnalyticsError;
use crate::range::RangeSelector;
use chrono::{DateTime, Utc};
use conftrack_model::{collections, entities::telemetry, EventKind, TelemetryEvent};
use conftrack_store::{Filter, Query, Store};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

/// Tunables for the dashboard summary.
#[derive(Debug, Clone)]
pub struct AnalyticsConfig {
    /// Maximum number of entries in the per-path ranking.
    pub top_pages_limit: usize,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self { top_pages_limit: 10 }
    }
}

/// One entry of the per-path view ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageCount {
    pub path: String,
    pub views: u64,
}

/// Whole-window totals per event kind.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionCounts {
    pub page_views: u64,
    pub downloads: u64,
    pub form_submits: u64,
    pub other: u64,
}

/// Everything the dashboard renders for one range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub range: &'static str,
    pub total_page_views: u64,
    pub unique_visitors: u64,
    pub top_pages: Vec<PageCount>,
    pub views_by_day: Vec<ViewBucket>,
    pub events_by_day: Vec<EventBucket>,
    pub interaction_counts: InteractionCounts,
}

/// Builds [`DashboardSummary`] values from stored telemetry rows.
pub struct Aggregator {
    store: Arc<dyn Store>,
    config: AnalyticsConfig,
}

impl Aggregator {
    #[must_use]
    pub fn new(store: Arc<dyn Store>, config: AnalyticsConfig) -> Self {
        Self { store, config }
    }

    /// Aggregate the window ending at `now`.
    ///
    /// Rows without a usable timestamp are skipped; a store failure is
    /// fatal because every figure depends on the same fetch.
    pub async fn summary(
        &self,
        range: RangeSelector,
        now: DateTime<Utc>,
    ) -> Result<DashboardSummary, AnalyticsError> {
        let window_start = range.window_start(now);
        let query = Query::filtered(Filter::gte(
            telemetry::fields::TIMESTAMP,
            window_start.to_rfc3339(),
        ));
        let docs = self.store.find(collections::TELEMETRY_EVENTS, query).await?;
        let events: Vec<TelemetryEvent> = docs
            .iter()
            .filter_map(TelemetryEvent::from_document)
            .collect();

        let interaction_counts = count_interactions(&events);
        let summary = DashboardSummary {
            range: range.as_str(),
            total_page_views: interaction_counts.page_views,
            unique_visitors: count_sessions(&events),
            top_pages: rank_pages(&events, self.config.top_pages_limit),
            views_by_day: view_series(range, now, &events),
            events_by_day: event_series(range, now, &events),
            interaction_counts,
        };

        tracing::info!(
            range = %range,
            rows = events.len(),
            page_views = summary.total_page_views,
            visitors = summary.unique_visitors,
            "aggregated dashboard summary"
        );
        Ok(summary)
    }
}

fn count_interactions(events: &[TelemetryEvent]) -> InteractionCounts {
    let mut counts = InteractionCounts::default();
    for event in events {
        match event.kind {
            EventKind::PageView => counts.page_views += 1,
            EventKind::Download => counts.downloads += 1,
            EventKind::FormSubmit => counts.form_submits += 1,
            EventKind::Other => counts.other += 1,
        }
    }
    counts
}

fn count_sessions(events: &[TelemetryEvent]) -> u64 {
    events
        .iter()
        .filter_map(|e| e.session_id.as_deref())
        .collect::<HashSet<_>>()
        .len() as u64
}

/// Rank paths by page-view count, descending. Ties keep alphabetical
/// path order so the ranking is stable run to run.
fn rank_pages(events: &[TelemetryEvent], limit: usize) -> Vec<PageCount> {
    let mut by_path: BTreeMap<&str, u64> = BTreeMap::new();
    for event in events.iter().filter(|e| e.kind == EventKind::PageView) {
        if let Some(path) = event.path.as_deref() {
            *by_path.entry(path).or_insert(0) += 1;
        }
    }

    let mut ranking: Vec<PageCount> = by_path
        .into_iter()
        .map(|(path, views)| PageCount {
            path: path.to_string(),
            views,
        })
        .collect();
    ranking.sort_by(|a, b| b.views.cmp(&a.views));
    ranking.truncate(limit);
    ranking
}
