use std::time::Duration;

use hdrhistogram::Histogram;

use super::LatencyPercentiles;

/// Bounded-memory latency distribution, recorded in microseconds.
#[derive(Debug)]
pub struct LatencyHistogram {
    hist: Histogram<u64>,
}

impl LatencyHistogram {
    /// Create a new latency histogram.
    ///
    /// # Errors
    ///
    /// Returns an error if the histogram cannot be created.
    pub fn new() -> Result<Self, String> {
        let hist = Histogram::<u64>::new(3)
            .map_err(|err| format!("Failed to create histogram: {}", err))?;
        Ok(Self { hist })
    }

    /// Record a latency value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be recorded.
    pub fn record(&mut self, latency: Duration) -> Result<(), String> {
        let micros = u64::try_from(latency.as_micros()).unwrap_or(u64::MAX).max(1);
        self.hist
            .record(micros)
            .map_err(|err| format!("Failed to record latency: {}", err))
    }

    #[must_use]
    pub fn percentiles(&self) -> LatencyPercentiles {
        if self.count() == 0 {
            return LatencyPercentiles::default();
        }

        LatencyPercentiles {
            p50: Duration::from_micros(self.hist.value_at_quantile(0.5)),
            p90: Duration::from_micros(self.hist.value_at_quantile(0.9)),
            p99: Duration::from_micros(self.hist.value_at_quantile(0.99)),
        }
    }

    #[must_use]
    pub fn count(&self) -> u64 {
        self.hist.len()
    }
}
