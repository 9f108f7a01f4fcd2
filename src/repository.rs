//! Request path: compile, execute, map

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::config::CompilerSettings;
use crate::error::FacetError;
use crate::executor::SearchExecutor;
use crate::metrics::SearchMetrics;
use crate::models::{Query, SearchResult};
use crate::query::{CompiledQuery, QueryCompiler, ResultMapper};
use crate::Result;

/// Runs abstract queries against one executor
pub struct Repository<E> {
    executor: E,
    compiler: QueryCompiler,
    metrics: Option<Arc<SearchMetrics>>,
}

impl<E: SearchExecutor> Repository<E> {
    pub fn new(executor: E, settings: CompilerSettings) -> Self {
        Self {
            executor,
            compiler: QueryCompiler::new(settings),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<SearchMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub fn compiler(&self) -> &QueryCompiler {
        &self.compiler
    }

    /// Compile without executing
    pub fn compile(&self, query: &Query) -> Result<CompiledQuery> {
        let start = Instant::now();
        let compiled = self.compiler.compile(query)?;
        if let Some(metrics) = &self.metrics {
            metrics.record_compile(start.elapsed().as_secs_f64());
        }

        debug!(
            filters = query.filter_count(),
            aggregations = query.aggregation_count(),
            from = query.from(),
            size = query.size(),
            "Compiled query"
        );
        Ok(compiled)
    }

    /// Compile `query`, run it and map the response
    ///
    /// Errors are returned unchanged; retrying is up to the caller.
    pub async fn search(&self, query: &Query) -> Result<SearchResult> {
        let start = Instant::now();
        let kind = if query.aggregation_count() > 0 { "faceted" } else { "plain" };

        let outcome = self.run(query).await;
        let elapsed = start.elapsed();

        match &outcome {
            Ok(result) => {
                let counters: usize = result.aggregations.iter().map(|a| a.counters().len()).sum();
                info!(
                    total_hits = result.total_hits,
                    entities = result.entity_count(),
                    counters,
                    latency_ms = elapsed.as_millis() as u64,
                    "Search completed"
                );
                if let Some(metrics) = &self.metrics {
                    metrics.record_search(kind, elapsed.as_secs_f64(), result.entity_count(), counters);
                }
            }
            Err(e) => {
                warn!(error = %e, retriable = e.is_retriable(), "Search failed");
                if let Some(metrics) = &self.metrics {
                    metrics.record_search_error(error_cause(e));
                }
            }
        }

        outcome
    }

    async fn run(&self, query: &Query) -> Result<SearchResult> {
        let compiled = self.compile(query)?;
        let raw = self
            .executor
            .execute(&compiled, query.from(), query.size())
            .await?;
        ResultMapper::map(query, &raw)
    }
}

fn error_cause(error: &FacetError) -> &'static str {
    match error {
        FacetError::MalformedRange { .. } => "malformed_range",
        FacetError::MalformedResponse(_) => "malformed_response",
        FacetError::Execution(_) => "execution",
        FacetError::InvalidToken(_) => "invalid_token",
        FacetError::InvalidRequest(_) => "invalid_request",
        FacetError::Serialization(_) => "serialization",
        FacetError::Io(_) => "io",
    }
}
