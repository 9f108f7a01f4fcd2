pub mod config;
pub mod error;
pub mod executor;
pub mod metrics;
pub mod models;
pub mod query;
pub mod repository;
pub mod token;

pub use config::CompilerSettings;
pub use error::{FacetError, Result};
pub use executor::{InMemoryExecutor, RawResponse, SearchExecutor};
pub use metrics::SearchMetrics;
pub use models::*;
pub use query::{CompiledQuery, QueryCompiler, ResultMapper};
pub use repository::Repository;
pub use token::{StaticTokenLocator, Token, TokenLocator, TokenRequest, TokenValidator};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
