//! In-memory client that drives requests through the pipeline.

use crate::error::TestError;
use crate::request::TestRequest;
use crate::response::TestResponse;
use charter_core::{HttpError, RouteContract};
use charter_pipeline::{Pipeline, Response, ValidatedRequest};
use futures_util::future::BoxFuture;
use std::future::Future;
use std::sync::Arc;

/// Handler stored by a [`TestClient`].
pub type TestHandler =
    Arc<dyn Fn(ValidatedRequest) -> BoxFuture<'static, anyhow::Result<Response>> + Send + Sync>;

/// Sends requests through a [`Pipeline`] without binding a port.
///
/// Routes are tried in registration order; the first contract whose method
/// and path pattern match the request handles it. Unmatched requests get a
/// rendered 404.
///
/// # Example
///
/// ```ignore
/// use charter_test::{TestClient, TestRequest};
///
/// let client = TestClient::new(Pipeline::default())
///     .route(contract, |req| async move { Ok(req.respond(req.params(), 200).await) });
///
/// let response = client.send(TestRequest::get("/things/1").build()?).await?;
/// response.assert_status(200);
/// ```
#[must_use]
pub struct TestClient {
    pipeline: Pipeline,
    routes: Vec<(Arc<RouteContract>, TestHandler)>,
}

impl TestClient {
    /// Creates a client with no routes.
    pub fn new(pipeline: Pipeline) -> Self {
        Self {
            pipeline,
            routes: Vec::new(),
        }
    }

    /// Registers a handler for a contract.
    pub fn route<H, Fut>(mut self, contract: impl Into<Arc<RouteContract>>, handler: H) -> Self
    where
        H: Fn(ValidatedRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Response>> + Send + 'static,
    {
        let handler: TestHandler = Arc::new(move |req| Box::pin(handler(req)));
        self.routes.push((contract.into(), handler));
        self
    }

    /// Returns the pipeline.
    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Sends a request and collects the response.
    ///
    /// # Errors
    ///
    /// Returns a [`TestError`] if the request cannot be converted or the
    /// response body cannot be read. Validation failures are responses, not
    /// errors.
    pub async fn send(&self, request: TestRequest) -> Result<TestResponse, TestError> {
        let method = request.method.clone();
        let path = request.uri.path().to_string();

        let route = self
            .routes
            .iter()
            .find(|(contract, _)| *contract.method() == method && contract.path().matches(&path));

        let response = match route {
            Some((contract, handler)) => {
                let params = contract.extract_params(&path);
                let handler = Arc::clone(handler);
                self.pipeline
                    .handle(contract, &params, request.into_http_request()?, move |req| {
                        handler(req)
                    })
                    .await
            }
            None => self
                .pipeline
                .render_error(HttpError::not_found(format!("No route for {method} {path}"))),
        };

        TestResponse::from_http(response).await
    }
}

impl std::fmt::Debug for TestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let routes: Vec<String> = self
            .routes
            .iter()
            .map(|(c, _)| format!("{} {}", c.method(), c.path().as_str()))
            .collect();
        f.debug_struct("TestClient")
            .field("pipeline", &self.pipeline)
            .field("routes", &routes)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use charter_core::{ResponseSpec, RouteDefinition, SchemaSpec};
    use serde_json::json;

    fn get_thing() -> RouteContract {
        RouteDefinition::get()
            .params(SchemaSpec::object(vec![(
                "thingId",
                SchemaSpec::string().required().pattern(r"^\d+$"),
            )]))
            .response(
                200,
                ResponseSpec::new("The thing").json(SchemaSpec::object(vec![(
                    "thingId",
                    SchemaSpec::string().required(),
                )])),
            )
            .standard_errors()
            .at("/things/{thingId}")
            .unwrap()
    }

    fn client() -> TestClient {
        TestClient::new(Pipeline::default()).route(get_thing(), |req| async move {
            let params = req.params().clone();
            Ok(req.respond(&params, 200).await)
        })
    }

    #[tokio::test]
    async fn test_routes_to_matching_contract() {
        let response = client()
            .send(TestRequest::get("/things/7").build().unwrap())
            .await
            .unwrap();

        response
            .assert_status(200)
            .assert_json(&json!({"thingId": "7"}));
    }

    #[tokio::test]
    async fn test_invalid_params_are_404() {
        let response = client()
            .send(TestRequest::get("/things/abc").build().unwrap())
            .await
            .unwrap();

        response
            .assert_status(404)
            .assert_message_contains("Error validating params");
    }

    #[tokio::test]
    async fn test_unmatched_route_is_404() {
        let client = client();

        let response = client
            .send(TestRequest::post("/things/7").build().unwrap())
            .await
            .unwrap();
        response.assert_status(404);

        let response = client
            .send(TestRequest::get("/widgets").build().unwrap())
            .await
            .unwrap();
        assert_eq!(
            response.error_message().as_deref(),
            Some("No route for GET /widgets")
        );
    }

    #[test]
    fn test_debug_lists_routes() {
        let debug = format!("{:?}", client());
        assert!(debug.contains("GET /things/{thingId}"));
    }
}
