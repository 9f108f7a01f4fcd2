use prometheus::{
    Counter, CounterVec, Encoder, Histogram, HistogramOpts, HistogramVec, Opts, Registry,
    TextEncoder,
};
use std::sync::Arc;

/// Prometheus metrics for the search path
#[derive(Clone)]
pub struct SearchMetrics {
    // Counters
    pub searches_total: CounterVec,
    pub search_errors: CounterVec,
    pub counters_returned: Counter,
    pub entities_returned: Counter,

    // Histograms
    pub search_latency: HistogramVec,
    pub compile_latency: Histogram,

    // Registry
    registry: Arc<Registry>,
}

impl SearchMetrics {
    /// Create a new SearchMetrics instance
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        // Counters
        let searches_total = CounterVec::new(
            Opts::new("facetq_searches_total", "Total number of searches by kind"),
            &["kind"],
        )?;
        registry.register(Box::new(searches_total.clone()))?;

        let search_errors = CounterVec::new(
            Opts::new("facetq_search_errors_total", "Total number of failed searches by cause"),
            &["cause"],
        )?;
        registry.register(Box::new(search_errors.clone()))?;

        let counters_returned = Counter::with_opts(Opts::new(
            "facetq_counters_returned_total",
            "Total number of facet counters returned",
        ))?;
        registry.register(Box::new(counters_returned.clone()))?;

        let entities_returned = Counter::with_opts(Opts::new(
            "facetq_entities_returned_total",
            "Total number of typed entities returned",
        ))?;
        registry.register(Box::new(entities_returned.clone()))?;

        // Histograms
        let search_latency = HistogramVec::new(
            HistogramOpts::new("facetq_search_latency_seconds", "End-to-end search latency")
                .buckets(vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0]),
            &["kind"],
        )?;
        registry.register(Box::new(search_latency.clone()))?;

        let compile_latency = Histogram::with_opts(
            HistogramOpts::new("facetq_compile_latency_seconds", "Query compilation latency")
                .buckets(vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05]),
        )?;
        registry.register(Box::new(compile_latency.clone()))?;

        Ok(Self {
            searches_total,
            search_errors,
            counters_returned,
            entities_returned,
            search_latency,
            compile_latency,
            registry: Arc::new(registry),
        })
    }

    /// Get the Prometheus registry
    pub fn registry(&self) -> Arc<Registry> {
        self.registry.clone()
    }

    /// Record a successful search
    pub fn record_search(&self, kind: &str, duration_secs: f64, entities: usize, counters: usize) {
        self.searches_total.with_label_values(&[kind]).inc();
        self.search_latency
            .with_label_values(&[kind])
            .observe(duration_secs);
        self.entities_returned.inc_by(entities as f64);
        self.counters_returned.inc_by(counters as f64);
    }

    /// Record the time spent compiling one query
    pub fn record_compile(&self, duration_secs: f64) {
        self.compile_latency.observe(duration_secs);
    }

    /// Record a failed search
    pub fn record_search_error(&self, cause: &str) {
        self.search_errors.with_label_values(&[cause]).inc();
    }

    /// Render every registered metric in the Prometheus text format
    pub fn export(&self) -> String {
        let mut buffer = Vec::new();
        let encoder = TextEncoder::new();
        if encoder.encode(&self.registry.gather(), &mut buffer).is_err() {
            return String::new();
        }
        String::from_utf8(buffer).unwrap_or_default()
    }
}

impl Default for SearchMetrics {
    fn default() -> Self {
        Self::new().expect("Failed to create metrics")
    }
}
