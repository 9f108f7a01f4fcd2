//! Access tokens and their permission rules
//!
//! A [`TokenValidator`] asks its locators in order for the token behind a
//! reference; the first enabled locator that knows it wins. The token then
//! has to grant the app, referrer, index and endpoint of the request and must
//! not be expired.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::FacetError;
use crate::Result;

/// Separator between verb and path in an endpoint permission
pub const ENDPOINT_SEPARATOR: &str = "~~";

/// Access token; empty lists grant everything
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub reference: String,
    pub app_id: String,
    #[serde(default)]
    pub indices: Vec<String>,
    #[serde(default)]
    pub http_referrers: Vec<String>,
    /// Granted endpoints as `verb~~path`, lowercase
    #[serde(default)]
    pub endpoints: Vec<String>,
    /// Lifetime in seconds from `updated_at`; 0 never expires
    #[serde(default)]
    pub seconds_valid: i64,
    /// Unix timestamp of the last update
    #[serde(default)]
    pub updated_at: i64,
}

impl Token {
    pub fn new(reference: impl Into<String>, app_id: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            app_id: app_id.into(),
            indices: Vec::new(),
            http_referrers: Vec::new(),
            endpoints: Vec::new(),
            seconds_valid: 0,
            updated_at: 0,
        }
    }

    pub fn with_indices<I, V>(mut self, indices: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        self.indices = indices.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_http_referrers<I, V>(mut self, referrers: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        self.http_referrers = referrers.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_endpoints<I, V>(mut self, endpoints: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        self.endpoints = endpoints.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_lifetime(mut self, updated_at: i64, seconds_valid: i64) -> Self {
        self.updated_at = updated_at;
        self.seconds_valid = seconds_valid;
        self
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.seconds_valid > 0 && self.updated_at + self.seconds_valid < now.timestamp()
    }
}

/// Endpoint permission string for a request: `lowercase(verb~~path)`, path
/// trimmed of slashes
pub fn endpoint(verb: &str, path: &str) -> String {
    format!("{}{}{}", verb, ENDPOINT_SEPARATOR, path.trim_matches('/')).to_lowercase()
}

/// Source of tokens
pub trait TokenLocator: Send + Sync {
    /// Whether this locator can be asked at all
    fn is_valid(&self) -> bool;

    fn find_by_reference(&self, app_id: &str, reference: &str) -> Option<Token>;
}

/// In-memory token store
#[derive(Debug, Default)]
pub struct StaticTokenLocator {
    tokens: RwLock<HashMap<(String, String), Token>>,
}

impl StaticTokenLocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tokens(tokens: impl IntoIterator<Item = Token>) -> Self {
        let locator = Self::new();
        for token in tokens {
            locator.add(token);
        }
        locator
    }

    /// Add or replace a token
    pub fn add(&self, token: Token) {
        self.tokens
            .write()
            .insert((token.app_id.clone(), token.reference.clone()), token);
    }

    pub fn remove(&self, app_id: &str, reference: &str) -> Option<Token> {
        self.tokens
            .write()
            .remove(&(app_id.to_string(), reference.to_string()))
    }
}

impl TokenLocator for StaticTokenLocator {
    fn is_valid(&self) -> bool {
        true
    }

    fn find_by_reference(&self, app_id: &str, reference: &str) -> Option<Token> {
        self.tokens
            .read()
            .get(&(app_id.to_string(), reference.to_string()))
            .cloned()
    }
}

/// What a request asks a token for
#[derive(Clone, Debug, Default)]
pub struct TokenRequest<'a> {
    pub app_id: &'a str,
    /// Empty when the request is not bound to an index
    pub index_id: &'a str,
    pub reference: &'a str,
    pub referrer: &'a str,
    pub path: &'a str,
    pub verb: &'a str,
}

/// Strategy chain of token locators plus the permission rules
#[derive(Default, Clone)]
pub struct TokenValidator {
    locators: Vec<Arc<dyn TokenLocator>>,
}

impl TokenValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a locator; locators are asked in insertion order
    pub fn with_locator(mut self, locator: Arc<dyn TokenLocator>) -> Self {
        self.locators.push(locator);
        self
    }

    pub fn validate(&self, request: &TokenRequest<'_>) -> Result<Token> {
        self.validate_at(request, Utc::now())
    }

    pub fn validate_at(&self, request: &TokenRequest<'_>, now: DateTime<Utc>) -> Result<Token> {
        let token = self
            .locators
            .iter()
            .filter(|locator| locator.is_valid())
            .find_map(|locator| locator.find_by_reference(request.app_id, request.reference));

        let denied = || FacetError::InvalidToken(request.reference.to_string());
        let Some(token) = token else {
            debug!(reference = %request.reference, "Token not found");
            return Err(denied());
        };

        let endpoint = endpoint(request.verb, request.path);
        let granted = token.app_id == request.app_id
            && grants(&token.http_referrers, request.referrer)
            && (request.index_id.is_empty() || grants(&token.indices, request.index_id))
            && grants(&token.endpoints, &endpoint)
            && !token.is_expired_at(now);

        if !granted {
            debug!(reference = %request.reference, endpoint = %endpoint, "Token denied");
            return Err(denied());
        }
        Ok(token)
    }
}

fn grants(allowed: &[String], value: &str) -> bool {
    allowed.is_empty() || allowed.iter().any(|a| a == value)
}
