#[cfg(test)]
mod tests {
    use anyhow::Result;
    use axum::{
        body::{to_bytes, Bytes},
        extract::{Path, Query, State},
        http::{
            header::{CONTENT_DISPOSITION, CONTENT_TYPE},
            HeaderMap, HeaderValue, StatusCode,
        },
        response::{IntoResponse, Response},
        Json,
    };

    use crate::{
        http_objects::{RetrieveBlobParams, UserRequest},
        routes::{
            blobs,
            payload::{FILE_NAME_HEADER, UUID_HEADER},
            users,
        },
        testing::TestService,
    };

    fn json_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers
    }

    async fn response_body(response: Response) -> Vec<u8> {
        to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec()
    }

    async fn response_json(response: Response) -> serde_json::Value {
        serde_json::from_slice(&response_body(response).await).unwrap()
    }

    async fn create_png(state: &crate::routes::RouteState, uuid: &str) -> Response {
        let body = format!(
            r#"{{"file_name":"a.png","content_type":"image/png","uuid":"{uuid}","image_data":"aGVsbG8="}}"#
        );
        blobs::create_blob(State(state.clone()), json_headers(), Bytes::from(body))
            .await
            .into_response()
    }

    #[tokio::test]
    async fn test_create_then_download_file() -> Result<()> {
        let test_srv = TestService::new().await?;
        let state = test_srv.route_state();

        let response = create_png(&state, "u1").await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = response_json(response).await;
        assert_eq!(body["uuid"], "u1");

        let response = blobs::download_blob_file(Path("u1".to_string()), State(state.clone()))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(CONTENT_TYPE).unwrap(),
            &HeaderValue::from_static("image/png")
        );
        assert_eq!(
            response.headers().get(CONTENT_DISPOSITION).unwrap(),
            &HeaderValue::from_static("attachment; filename=\"a.png\"")
        );
        assert_eq!(
            response.headers().get("content-length").unwrap(),
            &HeaderValue::from_static("5")
        );
        assert_eq!(response_body(response).await, b"hello");

        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_create_conflicts() -> Result<()> {
        let test_srv = TestService::new().await?;
        let state = test_srv.route_state();

        let response = create_png(&state, "u1").await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = create_png(&state, "u1").await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
        let body = response_json(response).await;
        assert_eq!(body["code"], "duplicate_identifier");

        // The first record survives.
        let content = state.blob_store.get_content("u1").await?;
        assert_eq!(content.image_data, b"hello");

        Ok(())
    }

    #[tokio::test]
    async fn test_missing_content_type_creates_no_row() -> Result<()> {
        let test_srv = TestService::new().await?;
        let state = test_srv.route_state();

        let body = r#"{"file_name":"a.png","uuid":"u1","image_data":"aGVsbG8="}"#;
        let response = blobs::create_blob(State(state.clone()), json_headers(), Bytes::from(body))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = response_json(response).await;
        assert_eq!(body["code"], "missing_content_type");
        assert!(body["error"].as_str().unwrap().contains("content_type"));

        assert!(state.blob_store.list().await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_unsupported_media_type_is_415() -> Result<()> {
        let test_srv = TestService::new().await?;
        let state = test_srv.route_state();

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        let response = blobs::create_blob(State(state.clone()), headers, Bytes::from("hello"))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);

        Ok(())
    }

    #[tokio::test]
    async fn test_raw_create_stores_body_verbatim() -> Result<()> {
        let test_srv = TestService::new().await?;
        let state = test_srv.route_state();

        let payload = b"\x89PNG\r\n\x1a\nbinary payload";
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("image/png"));
        headers.insert(FILE_NAME_HEADER, HeaderValue::from_static("raw.png"));
        headers.insert(UUID_HEADER, HeaderValue::from_static("u2"));

        let response = blobs::create_blob(
            State(state.clone()),
            headers,
            Bytes::from_static(payload),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = blobs::get_blob(
            Path("u2".to_string()),
            Query(RetrieveBlobParams { metadata: false }),
            State(state.clone()),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(CONTENT_DISPOSITION).unwrap(),
            &HeaderValue::from_static("inline; filename=\"raw.png\"")
        );
        assert_eq!(response_body(response).await, payload);

        Ok(())
    }

    #[tokio::test]
    async fn test_metadata_flag_returns_document_without_content() -> Result<()> {
        let test_srv = TestService::new().await?;
        let state = test_srv.route_state();

        create_png(&state, "u1").await;

        let response = blobs::get_blob(
            Path("u1".to_string()),
            Query(RetrieveBlobParams { metadata: true }),
            State(state.clone()),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::OK);
        let body = response_json(response).await;
        assert_eq!(body["uuid"], "u1");
        assert_eq!(body["file_name"], "a.png");
        assert_eq!(body["content_type"], "image/png");
        assert!(body.get("image_data").is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_raw_update_filename_only_keeps_content() -> Result<()> {
        let test_srv = TestService::new().await?;
        let state = test_srv.route_state();

        create_png(&state, "u1").await;

        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/octet-stream"),
        );
        headers.insert(FILE_NAME_HEADER, HeaderValue::from_static("b.png"));

        let response = blobs::update_blob(
            Path("u1".to_string()),
            State(state.clone()),
            headers,
            Bytes::new(),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::OK);
        let body = response_json(response).await;
        assert_eq!(body["blob"]["file_name"], "b.png");
        assert_eq!(body["blob"]["content_type"], "image/png");

        let content = state.blob_store.get_content("u1").await?;
        assert_eq!(content.image_data, b"hello");

        Ok(())
    }

    #[tokio::test]
    async fn test_update_without_fields_is_400() -> Result<()> {
        let test_srv = TestService::new().await?;
        let state = test_srv.route_state();

        // Validate-first: the missing identifier is not consulted when no
        // fields are provided.
        let response = blobs::update_blob(
            Path("missing".to_string()),
            State(state.clone()),
            json_headers(),
            Bytes::from("{}"),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = response_json(response).await;
        assert_eq!(body["code"], "no_fields_provided");

        Ok(())
    }

    #[tokio::test]
    async fn test_update_missing_blob_is_404() -> Result<()> {
        let test_srv = TestService::new().await?;
        let state = test_srv.route_state();

        let response = blobs::update_blob(
            Path("missing".to_string()),
            State(state.clone()),
            json_headers(),
            Bytes::from(r#"{"file_name":"b.png"}"#),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_twice() -> Result<()> {
        let test_srv = TestService::new().await?;
        let state = test_srv.route_state();

        create_png(&state, "u1").await;

        let response = blobs::delete_blob(Path("u1".to_string()), State(state.clone()))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::OK);
        let body = response_json(response).await;
        assert_eq!(body["uuid"], "u1");
        assert_eq!(body["message"], "Image blob deleted successfully");

        let response = blobs::delete_blob(Path("u1".to_string()), State(state.clone()))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        Ok(())
    }

    #[tokio::test]
    async fn test_users_crud() -> Result<()> {
        let test_srv = TestService::new().await?;
        let state = test_srv.route_state();

        let request = UserRequest {
            name: Some("Alice".to_string()),
            email: Some("alice@example.com".to_string()),
        };
        let response = users::create_user(State(state.clone()), Json(request))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = response_json(response).await;
        let id = body["id"].as_i64().unwrap();

        // Same email again conflicts.
        let request = UserRequest {
            name: Some("Other Alice".to_string()),
            email: Some("alice@example.com".to_string()),
        };
        let response = users::create_user(State(state.clone()), Json(request))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        // Missing fields are a 400.
        let request = UserRequest {
            name: Some("Bob".to_string()),
            email: None,
        };
        let response = users::create_user(State(state.clone()), Json(request))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = users::get_user(Path(id), State(state.clone()))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let response = users::delete_user(Path(id), State(state.clone()))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let response = users::get_user(Path(id), State(state.clone()))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        Ok(())
    }
}
