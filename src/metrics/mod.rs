use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One timed lifecycle operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricEntry {
    pub timestamp: DateTime<Utc>,
    pub operation: String, // "create" | "approve" | "disapprove" | "delete" | "undo" | "list" | ...
    pub duration_ns: u64,
    pub duration_us: f64,
    pub duration_ms: f64,
    pub success: bool,
    /// Error code when the operation failed.
    pub error_code: Option<String>,
}

impl MetricEntry {
    pub fn new(
        operation: impl Into<String>,
        duration_ns: u64,
        error_code: Option<&str>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            operation: operation.into(),
            duration_ns,
            duration_us: duration_ns as f64 / 1_000.0,
            duration_ms: duration_ns as f64 / 1_000_000.0,
            success: error_code.is_none(),
            error_code: error_code.map(str::to_string),
        }
    }
}

/// In-memory store for all timing entries collected across requests.
#[derive(Debug, Default)]
pub struct MetricsStore {
    pub entries: Vec<MetricEntry>,
}

impl MetricsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, entry: MetricEntry) {
        self.entries.push(entry);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Aggregate stats per operation.
    pub fn aggregated(&self) -> Vec<AggregatedMetric> {
        let mut map: HashMap<&str, (Vec<u64>, usize)> = HashMap::new();

        for e in &self.entries {
            let slot = map.entry(e.operation.as_str()).or_default();
            slot.0.push(e.duration_ns);
            if !e.success {
                slot.1 += 1;
            }
        }

        let mut out: Vec<AggregatedMetric> = map
            .into_iter()
            .map(|(op, (mut durations, failures))| {
                let count = durations.len();
                let total: u64 = durations.iter().sum();
                let avg = total / count as u64;
                durations.sort_unstable();
                let min = *durations.first().unwrap_or(&0);
                let max = *durations.last().unwrap_or(&0);
                let p50 = durations[count / 2];
                let p95 = durations[((count as f64 * 0.95) as usize).min(count.saturating_sub(1))];
                let p99 = durations[((count as f64 * 0.99) as usize).min(count.saturating_sub(1))];

                AggregatedMetric {
                    operation: op.to_string(),
                    sample_count: count,
                    failure_count: failures,
                    min_ns: min,
                    max_ns: max,
                    avg_ns: avg,
                    p50_ns: p50,
                    p95_ns: p95,
                    p99_ns: p99,
                    avg_ms: avg as f64 / 1_000_000.0,
                    p95_ms: p95 as f64 / 1_000_000.0,
                }
            })
            .collect();

        out.sort_by(|a, b| a.operation.cmp(&b.operation));
        out
    }

    /// Export all entries as a CSV string.
    pub fn to_csv(&self) -> anyhow::Result<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        wtr.write_record([
            "timestamp",
            "operation",
            "duration_ns",
            "duration_us",
            "duration_ms",
            "success",
            "error_code",
        ])?;

        for e in &self.entries {
            wtr.write_record([
                e.timestamp.to_rfc3339(),
                e.operation.clone(),
                e.duration_ns.to_string(),
                format!("{:.3}", e.duration_us),
                format!("{:.6}", e.duration_ms),
                e.success.to_string(),
                e.error_code.clone().unwrap_or_default(),
            ])?;
        }

        let data = wtr.into_inner()?;
        Ok(String::from_utf8(data)?)
    }

    /// Render a simple ASCII summary table.
    pub fn ascii_table(&self) -> String {
        let agg = self.aggregated();
        if agg.is_empty() {
            return "No metrics collected yet.".to_string();
        }

        let mut out = String::new();
        out.push_str(&format!(
            "\n{:<14} {:>9} {:>9} {:>12} {:>12} {:>12} {:>12}\n",
            "Operation", "Samples", "Failed", "Avg (µs)", "P50 (µs)", "P95 (µs)", "P99 (µs)"
        ));
        out.push_str(&"-".repeat(86));
        out.push('\n');

        for row in &agg {
            out.push_str(&format!(
                "{:<14} {:>9} {:>9} {:>12.2} {:>12.2} {:>12.2} {:>12.2}\n",
                row.operation,
                row.sample_count,
                row.failure_count,
                row.avg_ns as f64 / 1_000.0,
                row.p50_ns as f64 / 1_000.0,
                row.p95_ns as f64 / 1_000.0,
                row.p99_ns as f64 / 1_000.0,
            ));
        }

        out
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregatedMetric {
    pub operation: String,
    pub sample_count: usize,
    pub failure_count: usize,
    pub min_ns: u64,
    pub max_ns: u64,
    pub avg_ns: u64,
    pub p50_ns: u64,
    pub p95_ns: u64,
    pub p99_ns: u64,
    pub avg_ms: f64,
    pub p95_ms: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(samples: &[(&str, u64, Option<&str>)]) -> MetricsStore {
        let mut store = MetricsStore::new();
        for (op, ns, code) in samples {
            store.record(MetricEntry::new(*op, *ns, *code));
        }
        store
    }

    #[test]
    fn aggregates_per_operation_sorted_by_name() {
        let store = store_with(&[
            ("undo", 300, None),
            ("create", 100, None),
            ("create", 300, None),
            ("create", 200, Some("storage_failure")),
        ]);

        let agg = store.aggregated();
        assert_eq!(agg.len(), 2);
        assert_eq!(agg[0].operation, "create");
        assert_eq!(agg[0].sample_count, 3);
        assert_eq!(agg[0].failure_count, 1);
        assert_eq!(agg[0].min_ns, 100);
        assert_eq!(agg[0].max_ns, 300);
        assert_eq!(agg[0].avg_ns, 200);
        assert_eq!(agg[0].p50_ns, 200);
        assert_eq!(agg[1].operation, "undo");
    }

    #[test]
    fn csv_has_header_and_one_line_per_entry() {
        let store = store_with(&[("delete", 1_500, None), ("undo", 10, Some("empty_undo"))]);
        let csv = store.to_csv().unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("timestamp,operation,duration_ns"));
        assert!(lines[1].contains(",delete,1500,1.500,"));
        assert!(lines[2].ends_with(",false,empty_undo"));
    }

    #[test]
    fn empty_store_renders_placeholder() {
        let mut store = store_with(&[("list", 5, None)]);
        assert!(store.ascii_table().contains("list"));
        store.clear();
        assert_eq!(store.ascii_table(), "No metrics collected yet.");
        assert!(store.aggregated().is_empty());
    }
}
