//! Request identifiers in TypeID form
//!
//! Every request entering the API gets a `req_`-prefixed, UUIDv7-backed id
//! (e.g. `req_01h455vb4pex5vsknk084sn02q`). Ids sort by creation time, which
//! keeps interleaved log lines for concurrent listings easy to follow.

use http::{HeaderValue, Request};
use mti::prelude::*;
use std::fmt;
use std::str::FromStr;
use tower_http::request_id::{MakeRequestId, RequestId as TowerRequestId};

/// Identifier attached to one HTTP request
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(MagicTypeId);

impl RequestId {
    pub const PREFIX: &'static str = "req";

    #[must_use]
    pub fn new() -> Self {
        Self(Self::PREFIX.create_type_id::<V7>())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Header form of the id
    pub fn to_header_value(&self) -> Option<HeaderValue> {
        HeaderValue::from_str(self.as_str()).ok()
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestId {
    type Err = RequestIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = MagicTypeId::from_str(s).map_err(RequestIdError::Parse)?;
        let prefix = id.prefix().as_str();
        if prefix != Self::PREFIX {
            return Err(RequestIdError::InvalidPrefix(prefix.to_string()));
        }
        Ok(Self(id))
    }
}

/// Why a string is not a request id
#[derive(Debug, thiserror::Error)]
pub enum RequestIdError {
    #[error("failed to parse request ID: {0}")]
    Parse(#[from] MagicTypeIdError),

    #[error("expected prefix 'req', got '{0}'")]
    InvalidPrefix(String),
}

/// tower-http id generator producing [`RequestId`]s
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeTypedRequestId;

impl MakeRequestId for MakeTypedRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<TowerRequestId> {
        RequestId::new().to_header_value().map(TowerRequestId::new)
    }
}
