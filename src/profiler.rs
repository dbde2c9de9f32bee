//! Lightweight section profiler for stress tests.
//!
//! Collects wall-clock timing for named sections across many ticks and
//! prints an aggregated summary.

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Accumulated statistics for one named section.
#[derive(Debug, Default, Clone, Copy)]
pub struct SectionStats {
    pub total: Duration,
    pub calls: u64,
    pub max: Duration,
}

impl SectionStats {
    pub fn average(&self) -> Duration {
        if self.calls == 0 {
            Duration::ZERO
        } else {
            self.total / self.calls as u32
        }
    }
}

/// Measures named sections of code across ticks.
#[derive(Debug, Default)]
pub struct Profiler {
    sections: HashMap<String, SectionStats>,
    ticks: u64,
}

impl Profiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Time a closure and record it under `name`.
    pub fn time_section<F, R>(&mut self, name: &str, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let start = Instant::now();
        let result = f();
        let elapsed = start.elapsed();

        let stats = self.sections.entry(name.to_string()).or_default();
        stats.total += elapsed;
        stats.calls += 1;
        stats.max = stats.max.max(elapsed);

        result
    }

    /// Mark the end of one simulation tick.
    pub fn tick(&mut self) {
        self.ticks += 1;
    }

    pub fn tick_count(&self) -> u64 {
        self.ticks
    }

    pub fn section(&self, name: &str) -> Option<&SectionStats> {
        self.sections.get(name)
    }

    /// Print an aggregated summary, slowest section first.
    pub fn print_summary(&self) {
        println!("=== Profiler Summary ({} ticks) ===", self.ticks);

        let mut sections: Vec<_> = self.sections.iter().collect();
        sections.sort_by(|a, b| b.1.total.cmp(&a.1.total));

        println!(
            "{:<20} {:>12} {:>12} {:>12} {:>8}",
            "Section", "Total", "Avg", "Max", "Calls"
        );
        for (name, stats) in sections {
            println!(
                "{:<20} {:>12.2?} {:>12.2?} {:>12.2?} {:>8}",
                name,
                stats.total,
                stats.average(),
                stats.max,
                stats.calls
            );
        }
    }

    pub fn reset(&mut self) {
        self.sections.clear();
        self.ticks = 0;
    }
}
