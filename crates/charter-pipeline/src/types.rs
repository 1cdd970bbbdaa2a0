//! Common types used throughout the pipeline.

use bytes::Bytes;
use charter_core::RouteContract;
use http::{header, StatusCode};
use http_body_util::Full;
use std::sync::Arc;

/// The HTTP response type produced by the pipeline.
pub type Response = http::Response<Full<Bytes>>;

/// Response extension marking a response the pipeline already checked.
///
/// Only the pipeline can attach it. Rendered errors carry an unscoped
/// marker; responses validated through a [`Responder`](crate::Responder)
/// carry one scoped to that route's contract, so they are checked again if
/// handed to a different contract.
#[derive(Debug, Clone)]
pub struct ContractChecked {
    contract: Option<Arc<RouteContract>>,
}

impl ContractChecked {
    /// Returns true if the marker vouches for responses of `contract`.
    #[must_use]
    pub fn covers(&self, contract: &RouteContract) -> bool {
        self.contract
            .as_ref()
            .map_or(true, |checked| std::ptr::eq(Arc::as_ptr(checked), contract))
    }
}

/// Extension trait for pipeline responses.
pub trait ResponseExt {
    /// Returns true if the response carries a [`ContractChecked`] marker.
    fn is_contract_checked(&self) -> bool;
}

impl ResponseExt for Response {
    fn is_contract_checked(&self) -> bool {
        self.extensions().get::<ContractChecked>().is_some()
    }
}

/// Marks a pipeline-built response as checked for every contract.
pub(crate) fn mark_checked(mut response: Response) -> Response {
    response
        .extensions_mut()
        .insert(ContractChecked { contract: None });
    response
}

/// Marks a response as checked against `contract` only.
pub(crate) fn mark_checked_for(mut response: Response, contract: &Arc<RouteContract>) -> Response {
    response.extensions_mut().insert(ContractChecked {
        contract: Some(Arc::clone(contract)),
    });
    response
}

/// Builds a response with a fixed status, content type and body.
///
/// Falls back to [`fallback_response`] if the parts cannot be assembled.
#[must_use]
pub fn build_response(status: StatusCode, content_type: &str, body: Bytes) -> Response {
    http::Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, content_type)
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            tracing::error!(error = %e, "failed to build response");
            fallback_response()
        })
}

/// A bare 500 used when nothing better can be built.
#[must_use]
pub fn fallback_response() -> Response {
    let mut response = http::Response::new(Full::new(Bytes::from_static(
        b"Internal Server Error",
    )));
    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    mark_checked(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contract(path: &str) -> Arc<RouteContract> {
        Arc::new(charter_core::RouteDefinition::get().at(path).unwrap())
    }

    #[test]
    fn test_unscoped_marker_covers_every_contract() {
        let response = build_response(StatusCode::OK, "application/json", Bytes::from("{}"));
        assert!(!response.is_contract_checked());

        let response = mark_checked(response);
        let marker = response.extensions().get::<ContractChecked>().unwrap();
        assert!(marker.covers(&contract("/a")));
    }

    #[test]
    fn test_scoped_marker_covers_only_its_contract() {
        let own = contract("/things");
        let other = contract("/things");
        let response = mark_checked_for(
            build_response(StatusCode::OK, "application/json", Bytes::from("{}")),
            &own,
        );

        let marker = response.extensions().get::<ContractChecked>().unwrap();
        assert!(marker.covers(&own));
        assert!(!marker.covers(&other));
    }

    #[test]
    fn test_build_response() {
        let response = build_response(
            StatusCode::CREATED,
            "text/plain",
            Bytes::from_static(b"made"),
        );
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/plain"
        );
    }

    #[test]
    fn test_fallback_response() {
        let response = fallback_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.is_contract_checked());
    }
}
