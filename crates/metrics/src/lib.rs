use anyhow::Result;
use prometheus::{Encoder, HistogramOpts, Opts, Registry, TextEncoder};

pub use prometheus::{Histogram, IntCounter, IntCounterVec};

/// Per-process prometheus registry. Clones share the same registry.
#[derive(Clone)]
pub struct MetricsHandle {
    registry: Registry,
}

impl Default for MetricsHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsHandle {
    pub fn new() -> Self {
        Self {
            registry: Registry::new(),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn counter(&self, name: &str, help: &str) -> Result<IntCounter> {
        let counter = IntCounter::new(name, help)?;
        self.registry.register(Box::new(counter.clone()))?;
        Ok(counter)
    }

    pub fn counter_vec(&self, name: &str, help: &str, labels: &[&str]) -> Result<IntCounterVec> {
        let counter = IntCounterVec::new(Opts::new(name, help), labels)?;
        self.registry.register(Box::new(counter.clone()))?;
        Ok(counter)
    }

    pub fn histogram(&self, name: &str, help: &str) -> Result<Histogram> {
        let histogram = Histogram::with_opts(HistogramOpts::new(name, help))?;
        self.registry.register(Box::new(histogram.clone()))?;
        Ok(histogram)
    }

    /// Text exposition of every registered metric, with its content type.
    pub fn encode(&self) -> Result<(String, Vec<u8>)> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok((encoder.format_type().to_string(), buffer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_registered_counters() {
        let metrics = MetricsHandle::new();
        let generated = metrics
            .counter_vec("listings_generated_total", "listings", &["kind"])
            .unwrap();
        generated.with_label_values(&["new"]).inc();
        generated.with_label_values(&["new"]).inc();

        let (content_type, body) = metrics.encode().unwrap();
        let text = String::from_utf8(body).unwrap();
        assert!(content_type.starts_with("text/plain"));
        assert!(text.contains("listings_generated_total{kind=\"new\"} 2"));
    }

    #[test]
    fn duplicate_registration_is_an_error() {
        let metrics = MetricsHandle::new();
        metrics.counter("queries_total", "queries").unwrap();
        assert!(metrics.counter("queries_total", "queries").is_err());
    }

    #[test]
    fn clones_share_one_registry() {
        let metrics = MetricsHandle::new();
        let counter = metrics.clone().counter("ticks_total", "ticks").unwrap();
        counter.inc();
        let (_, body) = metrics.encode().unwrap();
        assert!(String::from_utf8(body).unwrap().contains("ticks_total 1"));
    }
}
