//! Request id generation, propagation and sensitive header masking

use axum::Router;
use http::header::{self, HeaderName};
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    sensitive_headers::SetSensitiveRequestHeadersLayer,
};

use crate::config::RequestTrackingConfig;
use crate::ids::MakeTypedRequestId;

/// Default request id header
pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Headers masked in request logs
pub const SENSITIVE_HEADERS: [HeaderName; 3] = [
    header::AUTHORIZATION,
    header::COOKIE,
    HeaderName::from_static("x-api-key"),
];

/// Resolve the configured request id header, falling back to `x-request-id`
pub fn request_id_header(config: &RequestTrackingConfig) -> HeaderName {
    match HeaderName::try_from(config.request_id_header.as_str()) {
        Ok(name) => name,
        Err(_) => {
            tracing::warn!(
                header = %config.request_id_header,
                "Invalid request id header name, using x-request-id"
            );
            REQUEST_ID_HEADER
        }
    }
}

/// Layer that stamps a fresh [`RequestId`](crate::ids::RequestId) on requests lacking one
pub fn request_id_layer(header: HeaderName) -> SetRequestIdLayer<MakeTypedRequestId> {
    SetRequestIdLayer::new(header, MakeTypedRequestId)
}

/// Layer that copies the request id onto the response
pub fn request_id_propagation_layer(header: HeaderName) -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::new(header)
}

/// Layer that marks [`SENSITIVE_HEADERS`] so traces redact them
pub fn sensitive_headers_layer() -> SetSensitiveRequestHeadersLayer {
    SetSensitiveRequestHeadersLayer::new(SENSITIVE_HEADERS)
}

/// Apply the tracking layers enabled in `config`
///
/// Must run after the trace layer is added so ids exist before spans open.
pub fn apply<S>(router: Router<S>, config: &RequestTrackingConfig) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    let header = request_id_header(config);
    let mut router = router;

    if config.mask_sensitive_headers {
        router = router.layer(sensitive_headers_layer());
    }
    if config.propagate_headers {
        router = router.layer(request_id_propagation_layer(header.clone()));
    }
    if config.request_id_enabled {
        router = router.layer(request_id_layer(header));
    }
    router
}
