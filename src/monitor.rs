use std::{
    collections::VecDeque,
    sync::Mutex,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use serde::Serialize;

const MAX_METRICS: usize = 1000;
const RECENT_METRICS: usize = 10;
const SLOW_REQUEST: Duration = Duration::from_secs(5);

const HEALTH_WINDOW: Duration = Duration::from_secs(5 * 60);
const CRITICAL_RESPONSE_MS: f64 = 10_000.0;
const CRITICAL_HIT_RATE: f64 = 0.2;
const WARNING_RESPONSE_MS: f64 = 5_000.0;
const WARNING_HIT_RATE: f64 = 0.5;

/// One engine call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metric {
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
    pub endpoint: String,
    pub duration_ms: u64,
    pub cache_hit: bool,
    pub district_count: usize,
    pub enhanced: bool,
}

/// Aggregates over the metrics of a time window.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceStats {
    pub total_requests: usize,
    pub average_response_time: f64,
    pub cache_hit_rate: f64,
    pub slowest_endpoint: String,
    pub fastest_endpoint: String,
    pub average_districts_processed: f64,
    pub recent_metrics: Vec<Metric>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Warning,
    Critical,
}

/// Rounded figures for one window of the summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowSummary {
    pub requests: usize,
    pub avg_response_time: u64,
    /// Percent, 0 to 100.
    pub cache_hit_rate: u64,
    pub avg_districts: u64,
}

impl From<&PerformanceStats> for WindowSummary {
    fn from(stats: &PerformanceStats) -> Self {
        Self {
            requests: stats.total_requests,
            avg_response_time: stats.average_response_time.round() as u64,
            cache_hit_rate: (stats.cache_hit_rate * 100.0).round() as u64,
            avg_districts: stats.average_districts_processed.round() as u64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceSummary {
    pub last_24_hours: WindowSummary,
    pub last_hour: WindowSummary,
    pub status: HealthStatus,
}

/// Bounded log of engine call timings.
#[derive(Debug, Default)]
pub struct PerformanceMonitor {
    metrics: Mutex<VecDeque<Metric>>,
}

fn now_ms() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map_or(0, |d| d.as_millis() as u64)
}

impl PerformanceMonitor {
    pub fn new() -> Self { Self::default() }

    /// Record a call that finished now.
    pub fn record(&self, endpoint: &str, duration: Duration, cache_hit: bool, district_count: usize, enhanced: bool) {
        if duration > SLOW_REQUEST {
            tracing::warn!("slow request detected: {endpoint} took {}ms", duration.as_millis());
        }
        self.push(Metric {
            timestamp: now_ms(),
            endpoint: endpoint.to_string(),
            duration_ms: duration.as_millis() as u64,
            cache_hit,
            district_count,
            enhanced,
        });
    }

    /// Record an already timestamped metric.
    pub fn push(&self, metric: Metric) {
        let Ok(mut metrics) = self.metrics.lock() else { return };
        metrics.push_back(metric);
        while metrics.len() > MAX_METRICS {
            metrics.pop_front();
        }
    }

    /// Stats over the metrics newer than `window`, or over all of them.
    pub fn stats(&self, window: Option<Duration>) -> PerformanceStats {
        self.stats_at(window, now_ms())
    }

    pub fn stats_at(&self, window: Option<Duration>, now_ms: u64) -> PerformanceStats {
        let Ok(metrics) = self.metrics.lock() else { return PerformanceStats::default() };
        let cutoff = window.map(|w| now_ms.saturating_sub(w.as_millis() as u64));
        let relevant: Vec<&Metric> = metrics.iter()
            .filter(|m| cutoff.is_none_or(|cutoff| m.timestamp > cutoff))
            .collect();
        if relevant.is_empty() { return PerformanceStats::default() }

        let n = relevant.len() as f64;
        let hits = relevant.iter().filter(|m| m.cache_hit).count();
        // Ties go to the earliest metric for the fastest and the latest for the slowest.
        let slowest = relevant.iter().max_by_key(|m| m.duration_ms);
        let fastest = relevant.iter().min_by_key(|m| m.duration_ms);

        PerformanceStats {
            total_requests: relevant.len(),
            average_response_time: relevant.iter().map(|m| m.duration_ms as f64).sum::<f64>() / n,
            cache_hit_rate: hits as f64 / n,
            slowest_endpoint: slowest.map(|m| m.endpoint.clone()).unwrap_or_default(),
            fastest_endpoint: fastest.map(|m| m.endpoint.clone()).unwrap_or_default(),
            average_districts_processed: relevant.iter().map(|m| m.district_count as f64).sum::<f64>() / n,
            recent_metrics: relevant[relevant.len().saturating_sub(RECENT_METRICS)..]
                .iter().map(|&m| m.clone()).collect(),
        }
    }

    pub fn summary(&self) -> PerformanceSummary { self.summary_at(now_ms()) }

    pub fn summary_at(&self, now_ms: u64) -> PerformanceSummary {
        let day = self.stats_at(Some(Duration::from_secs(24 * 60 * 60)), now_ms);
        let hour = self.stats_at(Some(Duration::from_secs(60 * 60)), now_ms);
        PerformanceSummary {
            last_24_hours: WindowSummary::from(&day),
            last_hour: WindowSummary::from(&hour),
            status: self.health_at(now_ms),
        }
    }

    /// Health over the last five minutes.
    pub fn health_at(&self, now_ms: u64) -> HealthStatus {
        let recent = self.stats_at(Some(HEALTH_WINDOW), now_ms);
        if recent.total_requests == 0 { return HealthStatus::Healthy }

        if recent.average_response_time > CRITICAL_RESPONSE_MS || recent.cache_hit_rate < CRITICAL_HIT_RATE {
            HealthStatus::Critical
        } else if recent.average_response_time > WARNING_RESPONSE_MS || recent.cache_hit_rate < WARNING_HIT_RATE {
            HealthStatus::Warning
        } else {
            HealthStatus::Healthy
        }
    }

    /// Every recorded metric, oldest first.
    pub fn export(&self) -> Vec<Metric> {
        self.metrics.lock().map(|m| m.iter().cloned().collect()).unwrap_or_default()
    }

    /// Drop metrics older than `older_than`, or all of them.
    pub fn clear(&self, older_than: Option<Duration>) {
        let Ok(mut metrics) = self.metrics.lock() else { return };
        match older_than {
            Some(age) => {
                let cutoff = now_ms().saturating_sub(age.as_millis() as u64);
                metrics.retain(|m| m.timestamp > cutoff);
            }
            None => metrics.clear(),
        }
    }
}
