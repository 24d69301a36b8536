// API Integration Tests
//
// Run with: cargo test --features api --test api_integration_tests

#[cfg(feature = "api")]
mod api_tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use crop_suitability::labels::reference_table;
    use crop_suitability::{create_router, AppState, RawTable, Recommender, RecommenderConfig};
    use serde_json::{json, Value};
    use tower::ServiceExt; // for oneshot

    // Helper: app over a seeded 100-row reference table
    fn create_test_app() -> axum::Router {
        let config = RecommenderConfig { n_trees: 20, ..Default::default() };
        let table = reference_table(100, 7).to_raw();
        create_router(AppState::new(Recommender::new(config), table))
    }

    // Helper: Parse JSON response
    async fn json_response(response: axum::response::Response) -> Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read response body");
        serde_json::from_slice(&body).expect("Failed to parse JSON")
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    // =========================================================================
    // Section 1: Health and catalogue
    // =========================================================================

    #[tokio::test]
    async fn test_health_check() {
        let response = create_test_app().oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_response(response).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["rows"], 100);
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_list_crops() {
        let response = create_test_app().oneshot(get("/api/crops")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_response(response).await;
        assert_eq!(body["count"], 24);
        assert_eq!(body["crops"].as_array().unwrap().len(), 24);
    }

    #[tokio::test]
    async fn test_get_crop_profile() {
        let response = create_test_app().oneshot(get("/api/crops/Wheat")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_response(response).await;
        assert_eq!(body["name"], "wheat");
        assert_eq!(body["ideal_ranges"]["temperature"], json!([15.0, 25.0]));
    }

    #[tokio::test]
    async fn test_unknown_crop_is_404() {
        let response = create_test_app().oneshot(get("/api/crops/quinoa")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(json_response(response).await["error"].is_string());
    }

    #[tokio::test]
    async fn test_default_observation_needs_timestamps_or_means() {
        // Reference table has no timestamp column, so the means are used
        let response = create_test_app().oneshot(get("/api/observation/default")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_response(response).await;
        assert!(body["ph"].as_f64().unwrap() > 3.5);
    }

    // =========================================================================
    // Section 2: Recommendations
    // =========================================================================

    #[tokio::test]
    async fn test_recommend_with_server_table() {
        let request = post_json(
            "/api/recommend",
            json!({
                "observation": {"n": 90, "p": 42, "k": 43, "temp": 24, "hum": 82, "ph": 6.0}
            }),
        );
        let response = create_test_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_response(response).await;
        assert_eq!(body["model_used"], true);
        assert_eq!(body["recommendations"].as_array().unwrap().len(), 5);
        assert!(body["accuracy_pct"].is_number());
        assert_eq!(body["matches"].as_object().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_recommend_with_request_rows_missing_ph() {
        let request = post_json(
            "/api/recommend",
            json!({
                "observation": {"nitrogen": 90, "phosphorus": 42, "potassium": 43,
                                "temperature": 24, "humidity": 82, "ph": 6.0},
                "rows": [
                    {"n": 90, "p": 42, "k": 43, "temp": 20.8, "hum": 82.0, "crop": "rice"},
                    {"n": 85, "p": 58, "k": 41, "temp": 21.7, "hum": 80.3, "crop": "maize"}
                ]
            }),
        );
        let response = create_test_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_response(response).await;
        assert_eq!(body["model_used"], false);
        assert!(body["accuracy_pct"].is_null());
        assert_eq!(body["recommendations"][0]["crop"], "rice");
        assert_eq!(body["general_advice"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_out_of_domain_ph_is_422() {
        let request = post_json(
            "/api/recommend",
            json!({
                "observation": {"nitrogen": 50, "phosphorus": 30, "potassium": 30,
                                "temperature": 25, "humidity": 60, "ph": 15}
            }),
        );
        let response = create_test_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = json_response(response).await;
        assert!(body["error"].as_str().unwrap().contains("ph"));
    }

    #[tokio::test]
    async fn test_missing_parameter_is_422() {
        let request = post_json(
            "/api/recommend",
            json!({"observation": {"nitrogen": 50, "phosphorus": 30}}),
        );
        let response = create_test_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_empty_server_table_falls_back() {
        let app = create_router(AppState::new(
            Recommender::new(RecommenderConfig::default()),
            RawTable::default(),
        ));
        let request = post_json(
            "/api/recommend",
            json!({"observation": {"n": 90, "p": 42, "k": 43, "temp": 24, "hum": 82, "ph": 6.0}}),
        );
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_response(response).await["model_used"], false);
    }
}
