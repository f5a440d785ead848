// src/utils/logging.rs - Logging helpers for the facet engine stages
use log::{debug, info};
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Grouping,
    Filtering,
    Counting,
    Fetching,
}

#[derive(Clone)]
pub struct ProcessingLogger {
    stage_name: &'static str,
    stage_emoji: &'static str,
    start_time: Instant,
}

impl ProcessingLogger {
    pub fn new(stage: Stage) -> Self {
        let (stage_name, stage_emoji) = match stage {
            Stage::Grouping => ("GROUPING", "🧩"),
            Stage::Filtering => ("FILTERING", "🔎"),
            Stage::Counting => ("COUNTING", "🔢"),
            Stage::Fetching => ("FETCHING", "📡"),
        };

        Self {
            stage_name,
            stage_emoji,
            start_time: Instant::now(),
        }
    }

    pub fn log_start(&self, detail: &str) {
        debug!(
            "[{}] {} 🚀 Starting {} ({})",
            self.stage_name,
            self.stage_emoji,
            self.stage_name.to_lowercase(),
            detail
        );
    }

    pub fn log_phase(&self, phase: &str, details: Option<&str>) {
        let elapsed = self.start_time.elapsed();
        match details {
            Some(details) => debug!(
                "[{}] {} 🔄 Phase: {} - {} [+{:.3}s]",
                self.stage_name,
                self.stage_emoji,
                phase,
                details,
                elapsed.as_secs_f32()
            ),
            None => debug!(
                "[{}] {} 🔄 Phase: {} [+{:.3}s]",
                self.stage_name,
                self.stage_emoji,
                phase,
                elapsed.as_secs_f32()
            ),
        }
    }

    pub fn log_grouping_complete(&self, raw_count: usize, dropped: usize, unique_properties: usize) {
        info!(
            "[{}] {} ✅ Grouping complete: {} raw records → {} unique properties ({} unnamed records dropped) in {:.2?}",
            self.stage_name,
            self.stage_emoji,
            raw_count,
            unique_properties,
            dropped,
            self.start_time.elapsed()
        );
    }

    pub fn log_filter_results(&self, candidates: usize, matched: usize, mappable: usize) {
        let percent_kept = if candidates > 0 {
            (matched as f64 / candidates as f64) * 100.0
        } else {
            0.0
        };
        info!(
            "[{}] {} 🎯 Filter: {} properties → {} matching ({:.1}% kept) → {} mappable",
            self.stage_name, self.stage_emoji, candidates, matched, percent_kept, mappable
        );
    }

    pub fn log_counts_complete(&self, options: usize) {
        debug!(
            "[{}] {} ✅ Counted {} facet options in {:.2?}",
            self.stage_name,
            self.stage_emoji,
            options,
            self.start_time.elapsed()
        );
    }

    pub fn log_cache_results(&self, hits: usize, misses: usize) {
        let total = hits + misses;
        if total > 0 {
            let hit_rate = (hits as f64 / total as f64) * 100.0;
            info!(
                "[{}] {} 💾 Cache results: {} hits, {} misses ({:.1}% hit rate)",
                self.stage_name, self.stage_emoji, hits, misses, hit_rate
            );
        }
    }

    pub fn log_fetch_complete(&self, request_id: &str, records: usize) {
        info!(
            "[{}] {} 📦 Request {} returned {} records in {:.2?}",
            self.stage_name,
            self.stage_emoji,
            request_id,
            records,
            self.start_time.elapsed()
        );
    }

    pub fn log_superseded(&self, request_id: &str) {
        info!(
            "[{}] {} ⏭️  Request {} superseded by a newer fetch",
            self.stage_name, self.stage_emoji, request_id
        );
    }
}
