use std::time::Instant;
use tdigest::TDigest;

/// Collects wall-clock durations of repeated recommendation calls and
/// estimates latency percentiles over them.
#[derive(Clone)]
pub struct Stopwatch {
    start_time: Instant,
    durations_micros: Vec<f64>,
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::new()
    }
}

impl Stopwatch {
    pub fn new() -> Stopwatch {
        Stopwatch {
            start_time: Instant::now(),
            durations_micros: Vec::new(),
        }
    }

    pub fn start(&mut self) {
        self.start_time = Instant::now();
    }

    pub fn stop(&mut self) {
        let duration = self.start_time.elapsed();
        self.durations_micros.push(duration.as_micros() as f64);
    }

    pub fn get_n(&self) -> usize {
        self.durations_micros.len()
    }

    pub fn get_percentile_in_micros(&self, q: f64) -> f64 {
        let t_digest = TDigest::new_with_size(100);
        let sorted_digest = t_digest.merge_unsorted(self.durations_micros.clone());
        sorted_digest.estimate_quantile(q)
    }
}
