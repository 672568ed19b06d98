//! Launch transport: how a payload reaches a child window at open time.
//!
//! The open request travels as a navigable URL, which cannot carry
//! arbitrarily large data. Payloads whose JSON fits under the configured
//! threshold ride inline as `data=`; larger ones are staged in a
//! [`PayloadStore`] and only `sessionId=` is passed.

use std::fmt;

use paneline_common::SessionId;
use paneline_config::schema::TransportConfig;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::TransportError;
use crate::store::PayloadStore;

pub const VIEW_PARAM: &str = "view";
pub const DATA_PARAM: &str = "data";
pub const SESSION_PARAM: &str = "sessionId";

/// How a staged payload was encoded into the launch URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchEncoding {
    Inline,
    Session(SessionId),
}

impl fmt::Display for LaunchEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LaunchEncoding::Inline => f.write_str("inline"),
            LaunchEncoding::Session(id) => write!(f, "session {id}"),
        }
    }
}

/// URL to open plus how the payload was carried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchTarget {
    pub url: String,
    pub encoding: LaunchEncoding,
}

impl LaunchTarget {
    pub fn session_id(&self) -> Option<&SessionId> {
        match &self.encoding {
            LaunchEncoding::Session(id) => Some(id),
            LaunchEncoding::Inline => None,
        }
    }
}

/// Picks inline or out-of-band encoding per payload.
#[derive(Debug, Clone)]
pub struct TransportSelector {
    base_url: String,
    inline_threshold: usize,
}

impl TransportSelector {
    pub fn new(base_url: impl Into<String>, inline_threshold: usize) -> Self {
        Self {
            base_url: base_url.into(),
            inline_threshold,
        }
    }

    pub fn from_config(config: &TransportConfig) -> Self {
        Self::new(config.base_url.trim(), config.inline_threshold as usize)
    }

    pub fn inline_threshold(&self) -> usize {
        self.inline_threshold
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Encode `payload` for opening `view`, staging it in `store` when its
    /// serialized form is larger than the threshold.
    pub fn stage(
        &self,
        view: &str,
        payload: &Value,
        store: &dyn PayloadStore,
    ) -> Result<LaunchTarget, TransportError> {
        let json = serde_json::to_string(payload)
            .map_err(|e| TransportError::InvalidPayload(e.to_string()))?;
        let view_param = urlencoding::encode(view);

        if json.len() <= self.inline_threshold {
            debug!(view, bytes = json.len(), "payload inlined into launch url");
            return Ok(LaunchTarget {
                url: format!(
                    "{}?{VIEW_PARAM}={view_param}&{DATA_PARAM}={}",
                    self.base_url,
                    urlencoding::encode(&json)
                ),
                encoding: LaunchEncoding::Inline,
            });
        }

        let id = store.put(&json)?;
        debug!(
            view,
            bytes = json.len(),
            threshold = self.inline_threshold,
            session_id = %id,
            "payload staged out of band"
        );
        Ok(LaunchTarget {
            url: format!(
                "{}?{VIEW_PARAM}={view_param}&{SESSION_PARAM}={}",
                self.base_url,
                urlencoding::encode(id.as_str())
            ),
            encoding: LaunchEncoding::Session(id),
        })
    }
}

/// Where the child finds its launch payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadSource {
    /// Raw JSON from the `data` parameter, already percent-decoded.
    Inline(String),
    Session(SessionId),
    Absent,
}

/// Child-side view of the launch URL query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchParams {
    pub view: Option<String>,
    pub source: PayloadSource,
}

impl LaunchParams {
    /// Parse the query part of a full URL. A missing query yields no view
    /// and no payload.
    pub fn from_url(url: &str) -> Self {
        let without_fragment = url.split_once('#').map_or(url, |(head, _)| head);
        let query = without_fragment
            .split_once('?')
            .map_or("", |(_, query)| query);
        Self::from_query(query)
    }

    /// Parse a raw query string (`a=1&b=2`, leading `?` tolerated).
    ///
    /// When both `sessionId` and `data` are present the session wins.
    pub fn from_query(query: &str) -> Self {
        let mut view = None;
        let mut data = None;
        let mut session = None;

        for pair in query.trim_start_matches('?').split('&') {
            if pair.is_empty() {
                continue;
            }
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let value = match urlencoding::decode(value) {
                Ok(value) => value.into_owned(),
                Err(e) => {
                    warn!(param = key, error = %e, "undecodable launch parameter skipped");
                    continue;
                }
            };
            match key {
                VIEW_PARAM => view = Some(value),
                DATA_PARAM => data = Some(value),
                SESSION_PARAM if !value.is_empty() => session = Some(SessionId::from_raw(value)),
                _ => {}
            }
        }

        let source = match (session, data) {
            (Some(id), _) => PayloadSource::Session(id),
            (None, Some(json)) => PayloadSource::Inline(json),
            (None, None) => PayloadSource::Absent,
        };
        Self { view, source }
    }

    /// Fetch and decode the launch payload.
    ///
    /// A session id the store does not know is fatal for this window.
    pub fn resolve(&self, store: &dyn PayloadStore) -> Result<Option<Value>, TransportError> {
        let json = match &self.source {
            PayloadSource::Absent => return Ok(None),
            PayloadSource::Inline(json) => json.clone(),
            PayloadSource::Session(id) => store
                .take(id)?
                .ok_or_else(|| TransportError::SessionNotFound(id.clone()))?,
        };
        serde_json::from_str(&json)
            .map(Some)
            .map_err(|e| TransportError::InvalidPayload(e.to_string()))
    }
}
