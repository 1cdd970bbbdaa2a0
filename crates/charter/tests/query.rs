//! Query string validation through the facade.

use charter::prelude::*;
use charter_test::{TestClient, TestRequest};
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
struct ListQuery {
    page: i64,
    #[serde(default)]
    tag: Vec<String>,
}

fn list_things() -> RouteContract {
    RouteDefinition::get()
        .query(SchemaSpec::object(vec![
            ("page", SchemaSpec::integer().required().coerce().minimum_int(1)),
            ("tag", SchemaSpec::array(SchemaSpec::string())),
        ]))
        .response(
            200,
            ResponseSpec::new("Query echo").json(SchemaSpec::object(vec![
                ("page", SchemaSpec::integer().required()),
                ("tags", SchemaSpec::array(SchemaSpec::string()).required()),
            ])),
        )
        .standard_errors()
        .at("/things")
        .unwrap()
}

fn client() -> TestClient {
    TestClient::new(Pipeline::default()).route(list_things(), |req| async move {
        let query: ListQuery = req.query_as()?;
        Ok(req
            .respond(&json!({"page": query.page, "tags": query.tag}), 200)
            .await)
    })
}

#[tokio::test]
async fn test_query_coerced_and_collected() {
    let response = client()
        .send(
            TestRequest::get("/things")
                .query("page", "2")
                .query("tag", "red")
                .query("tag", "blue")
                .build()
                .unwrap(),
        )
        .await
        .unwrap();

    response
        .assert_status(200)
        .assert_json(&json!({"page": 2, "tags": ["red", "blue"]}));
}

#[tokio::test]
async fn test_scalar_query_last_value_wins() {
    let response = client()
        .send(TestRequest::get("/things?page=1&page=3&tag=x").build().unwrap())
        .await
        .unwrap();

    response
        .assert_status(200)
        .assert_json(&json!({"page": 3, "tags": ["x"]}));
}

#[tokio::test]
async fn test_invalid_query_is_404() {
    let response = client()
        .send(TestRequest::get("/things?page=0").build().unwrap())
        .await
        .unwrap();

    response
        .assert_status(404)
        .assert_message_contains("Error validating query");
}
