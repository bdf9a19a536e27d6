mod common;

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use serde_json::Value;

use anime_recommender::{
    api::{create_router, AppState},
    middleware::REQUEST_ID_HEADER,
    services::Recommender,
};

fn create_test_server() -> TestServer {
    let recommender = Recommender::new(common::artifacts(), common::scoring()).unwrap();
    let app = create_router(AppState::new(recommender));
    TestServer::new(app).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let server = create_test_server();
    let response = server.get("/health").await;
    response.assert_status_ok();
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let server = create_test_server();
    let request_id = "3f0e4c8a-6b1d-4a52-9a8e-2f7c1d0b9e11";

    let response = server
        .get("/health")
        .add_header(
            HeaderName::from_static(REQUEST_ID_HEADER),
            HeaderValue::from_static(request_id),
        )
        .await;

    response.assert_status_ok();
    assert_eq!(
        response.header(REQUEST_ID_HEADER).to_str().unwrap(),
        request_id
    );
}

#[tokio::test]
async fn test_similar_users() {
    let server = create_test_server();

    let response = server
        .get("/users/1/similar")
        .add_query_param("k", 5)
        .add_query_param("threshold", 0.5)
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["user_id"], 1);
    let similar = body["similar_users"].as_array().unwrap();
    assert_eq!(similar.len(), 1);
    assert_eq!(similar[0]["user_id"], 2);
    assert!((similar[0]["similarity"].as_f64().unwrap() - 0.9).abs() < 1e-4);
}

#[tokio::test]
async fn test_similar_users_rejects_zero_k() {
    let server = create_test_server();
    let response = server.get("/users/1/similar").add_query_param("k", 0).await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_similar_users_unknown_user() {
    let server = create_test_server();
    let response = server.get("/users/999/similar").await;
    response.assert_status(StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["error"], "user 999 not found");
}

#[tokio::test]
async fn test_user_preferences_include_catalog_names() {
    let server = create_test_server();

    let response = server.get("/users/1/preferences").await;
    response.assert_status_ok();

    let body: Value = response.json();
    let preferences = body["preferences"].as_array().unwrap();
    assert_eq!(preferences.len(), 1);
    assert_eq!(preferences[0]["item_id"], 10);
    assert_eq!(preferences[0]["name"], "Cowboy Bebop");
    assert_eq!(preferences[0]["rating"], 5.0);
    assert_eq!(preferences[0]["genres"][1], "Sci-Fi");
}

#[tokio::test]
async fn test_user_preferences_without_ratings() {
    let server = create_test_server();
    let response = server.get("/users/4/preferences").await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_recommendations_flow() {
    let server = create_test_server();

    let response = server.get("/users/1/recommendations").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["weights"]["collaborative"], 0.7);
    let recommendations = body["recommendations"].as_array().unwrap();
    let ids: Vec<u64> = recommendations
        .iter()
        .map(|r| r["item_id"].as_u64().unwrap())
        .collect();
    assert_eq!(ids, vec![12, 14]);
    assert_eq!(recommendations[0]["name"], "Trigun");

    let scores: Vec<f64> = recommendations
        .iter()
        .map(|r| r["score"].as_f64().unwrap())
        .collect();
    assert!(scores.windows(2).all(|w| w[0] >= w[1]));
}

#[tokio::test]
async fn test_recommendations_overrides() {
    let server = create_test_server();

    let response = server
        .get("/users/1/recommendations")
        .add_query_param("top_n", 1)
        .add_query_param("collaborative_weight", 0.0)
        .add_query_param("content_weight", 1.0)
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    let recommendations = body["recommendations"].as_array().unwrap();
    assert_eq!(recommendations.len(), 1);
    assert_eq!(recommendations[0]["item_id"], 14);
}

#[tokio::test]
async fn test_recommendations_invalid_parameters() {
    let server = create_test_server();

    let response = server
        .get("/users/1/recommendations")
        .add_query_param("top_n", 0)
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = server
        .get("/users/1/recommendations")
        .add_query_param("content_weight", -1.0)
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_recommendations_unknown_user() {
    let server = create_test_server();
    let response = server.get("/users/999/recommendations").await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_similar_items() {
    let server = create_test_server();

    let response = server.get("/items/10/similar").add_query_param("k", 2).await;
    response.assert_status_ok();

    let body: Value = response.json();
    let similar = body["similar_items"].as_array().unwrap();
    assert_eq!(similar.len(), 2);
    // [0.9, 0.2] is the closest direction to [1.0, 0.1]
    assert_eq!(similar[0]["item_id"], 14);
    assert_eq!(similar[0]["name"], "Space Dandy");
}

#[tokio::test]
async fn test_similar_items_unknown_item() {
    let server = create_test_server();
    let response = server.get("/items/404/similar").await;
    response.assert_status(StatusCode::NOT_FOUND);
}
