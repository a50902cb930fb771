//! Protocol, decode and transport failures end to end.

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use aktiva_auth::Credentials;
    use aktiva_client::{Client, ClientConfig, ClientError, ErrorKind, NoParams, RequestContext, TransportError};
    use http::{Method, StatusCode};
    use tokio_util::sync::CancellationToken;

    use crate::{MockResponse, MockServer, TEST_API_ID, TEST_API_KEY};

    async fn get(client: &Client, template: &str, ctx: Option<RequestContext>) -> ClientError {
        client
            .send(
                ctx,
                Method::GET,
                template,
                &NoParams,
                None::<&()>,
                None::<&mut ()>,
            )
            .await
            .unwrap_err()
    }

    #[tokio::test]
    async fn test_should_parse_json_error_body() {
        let server = MockServer::start().await.unwrap();
        server.mock(
            "/api/v1/getinvoice",
            MockResponse::json(
                StatusCode::BAD_REQUEST,
                r#"{"message":"Invalid request","MessageDetail":"Invoice id missing"}"#,
            ),
        );

        let err = get(&server.client(), "getinvoice", None).await;

        assert_eq!(err.kind(), ErrorKind::Protocol);
        let response = err.response().unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.entries().len(), 1);
        assert_eq!(
            response.entries()[0].detail.as_deref(),
            Some("Invoice id missing")
        );
        assert_eq!(err.to_string(), "Invalid request: Invoice id missing");
    }

    #[tokio::test]
    async fn test_should_use_status_line_for_foreign_content_type() {
        let server = MockServer::start().await.unwrap();
        server.mock(
            "/api/v1/broken",
            MockResponse::json(StatusCode::BAD_GATEWAY, "<html>proxy error</html>")
                .with_content_type(Some("text/html")),
        );

        let err = get(&server.client(), "broken", None).await;

        assert_eq!(err.kind(), ErrorKind::Protocol);
        assert_eq!(err.to_string(), "502 Bad Gateway");
        assert_eq!(
            err.response().unwrap().response().body().as_ref(),
            b"<html>proxy error</html>"
        );
    }

    #[tokio::test]
    async fn test_should_report_unrouted_path_as_protocol_error() {
        let server = MockServer::start().await.unwrap();

        let err = get(&server.client(), "nowhere", None).await;

        assert_eq!(err.kind(), ErrorKind::Protocol);
        assert_eq!(err.response().unwrap().status(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "404 Not Found");
    }

    #[tokio::test]
    async fn test_should_keep_empty_error_body_without_entries() {
        let server = MockServer::start().await.unwrap();
        server.mock(
            "/api/v1/locked",
            MockResponse::json(StatusCode::CONFLICT, ""),
        );

        let err = get(&server.client(), "locked", None).await;

        let response = err.response().unwrap();
        assert!(response.entries().is_empty());
        assert_eq!(err.to_string(), "409 Conflict");
    }

    #[tokio::test]
    async fn test_should_fail_when_deadline_passes() {
        let server = MockServer::start().await.unwrap();
        server.mock(
            "/api/v1/slow",
            MockResponse::json(StatusCode::OK, "{}").with_delay(Duration::from_secs(5)),
        );

        let ctx = RequestContext::new().with_timeout(Duration::from_millis(100));
        let err = get(&server.client(), "slow", Some(ctx)).await;

        assert_eq!(err.kind(), ErrorKind::Transport);
        assert!(matches!(
            err,
            ClientError::Transport(TransportError::DeadlineExceeded)
        ));
    }

    #[tokio::test]
    async fn test_should_fail_when_cancelled_in_flight() {
        let server = MockServer::start().await.unwrap();
        server.mock(
            "/api/v1/slow",
            MockResponse::json(StatusCode::OK, "{}").with_delay(Duration::from_secs(5)),
        );

        let token = CancellationToken::new();
        let trigger = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            trigger.cancel();
        });

        let ctx = RequestContext::new().with_cancellation(token);
        let err = get(&server.client(), "slow", Some(ctx)).await;

        assert!(matches!(
            err,
            ClientError::Transport(TransportError::Cancelled)
        ));
    }

    #[tokio::test]
    async fn test_should_surface_connection_failure() {
        let base_url = {
            let server = MockServer::start().await.unwrap();
            server.base_url()
        };
        // The listener is gone once the server task is aborted.
        tokio::time::sleep(Duration::from_millis(50)).await;

        let client = Client::new(
            Credentials::new(TEST_API_ID, TEST_API_KEY),
            ClientConfig::default().with_base_url(base_url),
        )
        .unwrap();
        let err = get(&client, "ping", None).await;

        assert_eq!(err.kind(), ErrorKind::Transport);
        assert!(matches!(
            err,
            ClientError::Transport(TransportError::Http(_))
        ));
    }
}
