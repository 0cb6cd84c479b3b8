use std::collections::BTreeMap;

use chrono::{NaiveDate, TimeZone};
use monitor_core::{TokenCounts, UsageEntry, total_tokens};
use serde::Serialize;

use crate::types::SortOrder;

/// Inclusive date bounds for the daily report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DailyQuery {
    pub since: Option<NaiveDate>,
    pub until: Option<NaiveDate>,
    pub order: SortOrder,
}

impl DailyQuery {
    /// Accepts `YYYY-MM-DD` or `YYYYMMDD`.
    pub fn parse_date(value: &str) -> Option<NaiveDate> {
        let value = value.trim();
        NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .or_else(|_| NaiveDate::parse_from_str(value, "%Y%m%d"))
            .ok()
    }

    fn contains(&self, date: NaiveDate) -> bool {
        self.since.is_none_or(|since| date >= since) && self.until.is_none_or(|until| date <= until)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyUsage {
    pub date: NaiveDate,
    pub token_counts: TokenCounts,
    pub total_tokens: u64,
    #[serde(rename = "costUSD")]
    pub cost_usd: f64,
    pub models: Vec<String>,
}

#[derive(Default)]
struct DailyAccumulator {
    token_counts: TokenCounts,
    cost_usd: f64,
    models: Vec<String>,
}

impl DailyAccumulator {
    fn add_entry(&mut self, entry: &UsageEntry) {
        self.token_counts.add(&entry.token_counts);
        self.cost_usd += entry.cost_usd;
        if let Some(model) = entry.model.as_ref()
            && !self.models.contains(model)
        {
            self.models.push(model.clone());
        }
    }

    fn into_daily_usage(self, date: NaiveDate) -> DailyUsage {
        DailyUsage {
            date,
            total_tokens: total_tokens(&self.token_counts),
            token_counts: self.token_counts,
            cost_usd: self.cost_usd,
            models: self.models,
        }
    }
}

/// Buckets entries by calendar day in `tz`.
pub fn daily_report<Tz: TimeZone>(
    entries: &[UsageEntry],
    query: &DailyQuery,
    tz: &Tz,
) -> Vec<DailyUsage> {
    let mut days: BTreeMap<NaiveDate, DailyAccumulator> = BTreeMap::new();
    for entry in entries {
        let date = entry.timestamp.with_timezone(tz).date_naive();
        if !query.contains(date) {
            continue;
        }
        days.entry(date).or_default().add_entry(entry);
    }
    let mut report: Vec<DailyUsage> = days
        .into_iter()
        .map(|(date, acc)| acc.into_daily_usage(date))
        .collect();
    if query.order == SortOrder::Desc {
        report.reverse();
    }
    report
}
