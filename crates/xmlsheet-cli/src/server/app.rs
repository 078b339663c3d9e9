//! Axum application setup.

use axum::{
    Router,
    routing::{delete, get, post},
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use super::handlers;
use super::state::AppState;

/// Create the Axum router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration for local development
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Catalog
        .route("/catalog", get(handlers::get_catalog))
        .route("/load", post(handlers::load_xml))
        .route("/load-url", post(handlers::load_url))
        .route("/status", get(handlers::get_status))
        .route("/restore", post(handlers::restore))
        // Overlay edits
        .route(
            "/records/:id/fields",
            get(handlers::get_fields).post(handlers::set_field),
        )
        .route("/records/:id/fields/:name", delete(handlers::remove_field))
        .route("/groups", post(handlers::create_group))
        .route("/columns/:name", delete(handlers::delete_column))
        // View and export
        .route(
            "/view",
            get(handlers::get_view).put(handlers::update_view),
        )
        .route("/export/xml", post(handlers::export_xml))
        .route("/export/csv", post(handlers::export_csv));

    Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Start the web server.
pub async fn run_server(state: AppState, port: u16) -> Result<(), Box<dyn std::error::Error>> {
    let app = create_router(state);
    let addr = std::net::SocketAddr::from(([127, 0, 0, 1], port));

    info!(%addr, "server listening");
    println!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use serde_json::{Value, json};
    use tower::util::ServiceExt;
    use xmlsheet::Catalog;

    const ANIMALS: &str = "<CATALOG>\
        <ANIMAL><NAME>Lion</NAME><HABITAT>Savanna</HABITAT></ANIMAL>\
        <ANIMAL><NAME>Owl</NAME><HABITAT>Forest</HABITAT></ANIMAL>\
        </CATALOG>";

    fn loaded_state() -> AppState {
        let mut catalog = Catalog::in_memory();
        catalog.load_xml(ANIMALS).unwrap();
        AppState::new(catalog)
    }

    async fn send(state: &AppState, request: Request<Body>) -> (StatusCode, String) {
        let response = create_router(state.clone()).oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn empty_request(method: &str, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    #[tokio::test]
    async fn test_load_and_get_catalog() {
        let state = AppState::new(Catalog::in_memory());

        let load = Request::builder()
            .method("POST")
            .uri("/api/load")
            .body(Body::from(ANIMALS))
            .unwrap();
        let (status, body) = send(&state, load).await;
        assert_eq!(status, StatusCode::OK);
        let summary: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(summary["record_tag"], "ANIMAL");
        assert_eq!(summary["record_count"], 2);

        let (status, body) = send(&state, get_request("/api/catalog")).await;
        assert_eq!(status, StatusCode::OK);
        let catalog: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(catalog["loaded"], true);
        assert_eq!(catalog["records"][1]["slot_1"], "Owl");
        assert_eq!(catalog["labels"]["slot_2"], "HABITAT");
    }

    #[tokio::test]
    async fn test_load_invalid_xml_is_bad_request() {
        let state = loaded_state();
        let load = Request::builder()
            .method("POST")
            .uri("/api/load")
            .body(Body::from("<ROOT/>"))
            .unwrap();

        let (status, body) = send(&state, load).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let error: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(error["error"], "schema_error");

        // Previous document is still in place
        assert_eq!(state.catalog.read().await.records().len(), 2);
    }

    // =========================================================================
    // Overlay edits
    // =========================================================================

    #[tokio::test]
    async fn test_set_and_remove_field() {
        let state = loaded_state();

        let (status, body) = send(
            &state,
            json_request(
                "POST",
                "/api/records/1/fields",
                json!({"name": "slot_1", "value": "Panthera leo"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let fields: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(fields["fields"][0]["label"], "NAME");

        let (_, body) = send(&state, get_request("/api/catalog")).await;
        let catalog: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(catalog["records"][0]["slot_1"], "Panthera leo");

        let (status, body) = send(
            &state,
            empty_request("DELETE", "/api/records/1/fields/slot_1"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, r#"{"removed":true}"#);

        let (_, body) = send(&state, get_request("/api/records/1/fields")).await;
        let fields: Value = serde_json::from_str(&body).unwrap();
        assert!(fields["fields"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_record_is_not_found() {
        let state = loaded_state();
        let (status, body) = send(&state, get_request("/api/records/99/fields")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("\"error\":\"not_found\""));
    }

    #[tokio::test]
    async fn test_blank_field_name_is_bad_request() {
        let state = loaded_state();
        let (status, body) = send(
            &state,
            json_request(
                "POST",
                "/api/records/1/fields",
                json!({"name": "  ", "value": "x"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("validation_error"));
    }

    #[tokio::test]
    async fn test_group_then_delete_column() {
        let state = loaded_state();

        let (status, body) = send(
            &state,
            json_request(
                "POST",
                "/api/groups",
                json!({"label": "Night Hunters", "record_ids": ["2", "2"]}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let column: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(column["name"], "night_hunters");
        assert_eq!(column["label"], "Night Hunters");
        assert_eq!(column["records"], 1);

        let (status, body) = send(
            &state,
            empty_request("DELETE", "/api/columns/night_hunters"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let deleted: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(deleted["records"], 1);
        assert!(!state.catalog.read().await.view().has_custom_column("night_hunters"));
    }

    #[tokio::test]
    async fn test_restore_drops_edits() {
        let state = loaded_state();
        state
            .catalog
            .write()
            .await
            .add_custom_field("1", "notes", "Notes", "x")
            .unwrap();

        let (status, body) = send(&state, empty_request("POST", "/api/restore")).await;
        assert_eq!(status, StatusCode::OK);
        let status_body: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(status_body["custom_field_count"], 0);
        assert_eq!(status_body["record_count"], 2);
    }

    // =========================================================================
    // View and export
    // =========================================================================

    #[tokio::test]
    async fn test_view_update_shapes_csv_export() {
        let state = loaded_state();

        let (status, _) = send(
            &state,
            json_request(
                "PUT",
                "/api/view",
                json!({
                    "hide": ["slot_2"],
                    "sort": {"field": "slot_1", "direction": "desc"}
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let response = create_router(state.clone())
            .oneshot(empty_request("POST", "/api/export/csv"))
            .await
            .unwrap();
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/csv; charset=utf-8"
        );
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(
            String::from_utf8(body.to_vec()).unwrap(),
            "\"ID\",\"NAME\"\n\"2\",\"Owl\"\n\"1\",\"Lion\"\n"
        );
    }

    #[tokio::test]
    async fn test_invalid_sort_leaves_view_untouched() {
        let state = loaded_state();

        let (status, _) = send(
            &state,
            json_request(
                "PUT",
                "/api/view",
                json!({"hide": ["slot_1"], "sort": {"field": "notes", "direction": "asc"}}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(state.catalog.read().await.view().is_visible("slot_1"));
    }

    #[tokio::test]
    async fn test_export_xml() {
        let state = loaded_state();
        let (status, body) = send(&state, empty_request("POST", "/api/export/xml")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(body.contains("<NAME>Lion</NAME>"));
    }

    #[tokio::test]
    async fn test_status_without_document() {
        let state = AppState::new(Catalog::in_memory());
        let (status, body) = send(&state, get_request("/api/status")).await;
        assert_eq!(status, StatusCode::OK);
        let summary: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(summary["record_count"], 0);
        assert_eq!(summary["overlay_version"], "1.0.0");
    }
}
