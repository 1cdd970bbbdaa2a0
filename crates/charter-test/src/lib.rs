//! # Charter Test
//!
//! In-memory testing for contract-validated handlers.
//!
//! Requests go through the same [`Pipeline`](charter_pipeline::Pipeline)
//! used in production, so tests observe the exact status codes and error
//! bodies a client would.
//!
//! ## Example
//!
//! ```ignore
//! use charter_test::{TestClient, TestRequest};
//! use serde_json::json;
//!
//! #[tokio::test]
//! async fn test_create_thing() {
//!     let client = TestClient::new(Pipeline::default()).route(contract, handler);
//!
//!     let response = client
//!         .send(
//!             TestRequest::post("/things/1")
//!                 .json(&json!({"name": "foo", "description": "bar"}))
//!                 .build()
//!                 .unwrap(),
//!         )
//!         .await
//!         .unwrap();
//!
//!     response.assert_status(200);
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/charter-test/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod client;
mod error;
mod request;
mod response;

pub use client::{TestClient, TestHandler};
pub use error::TestError;
pub use request::{TestRequest, TestRequestBuilder, MULTIPART_BOUNDARY};
pub use response::TestResponse;
