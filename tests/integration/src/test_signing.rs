//! Signature and request shape as seen by the server.

#[cfg(test)]
mod tests {
    use aktiva_auth::Credentials;
    use aktiva_client::{Client, NoParams};
    use http::header::{ACCEPT, CONTENT_TYPE, USER_AGENT};
    use http::{Method, StatusCode};
    use serde_json::json;

    use crate::{MockResponse, MockServer, TEST_API_ID};

    #[tokio::test]
    async fn test_should_send_request_with_valid_signature() {
        let server = MockServer::start().await.unwrap();
        server.mock(
            "/api/v1/getcustomers",
            MockResponse::json(StatusCode::OK, "[]"),
        );

        let body = json!({"Name": "Acme OÜ", "RegNo": "12345678"});
        server
            .client()
            .send(
                None,
                Method::POST,
                "getcustomers",
                &NoParams,
                Some(&body),
                None::<&mut ()>,
            )
            .await
            .unwrap();

        let requests = server.requests();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.verification.as_ref().unwrap(), TEST_API_ID);
        assert_eq!(request.body, serde_json::to_vec(&body).unwrap());
        assert_eq!(
            request.headers[CONTENT_TYPE],
            "application/json; charset=utf-8"
        );
        assert_eq!(request.headers[ACCEPT], "application/json");
        assert!(
            request.headers[USER_AGENT]
                .to_str()
                .unwrap()
                .starts_with("aktiva-client/")
        );
    }

    #[tokio::test]
    async fn test_should_keep_template_query_before_auth_params() {
        let server = MockServer::start().await.unwrap();
        server.mock(
            "/api/v1/customers/a%2Fb",
            MockResponse::json(StatusCode::OK, "{}"),
        );

        server
            .client()
            .send(
                None,
                Method::GET,
                "customers/{{ .id }}?page={{.page}}",
                &[("id", "a/b"), ("page", "2")],
                None::<&()>,
                None::<&mut ()>,
            )
            .await
            .unwrap();

        let request = &server.requests()[0];
        assert_eq!(request.path, "/api/v1/customers/a%2Fb");
        assert!(request.query.starts_with("page=2&ApiId="));
        assert!(request.verification.is_ok());
        assert!(request.body.is_empty());
    }

    #[tokio::test]
    async fn test_should_be_rejected_with_wrong_key() {
        let server = MockServer::start().await.unwrap();
        server.mock("/api/v1/ping", MockResponse::json(StatusCode::OK, "{}"));

        let client = Client::new(
            Credentials::new(TEST_API_ID, "not-the-key"),
            server.config(),
        )
        .unwrap();
        client
            .send(
                None,
                Method::GET,
                "ping",
                &NoParams,
                None::<&()>,
                None::<&mut ()>,
            )
            .await
            .unwrap();

        let request = &server.requests()[0];
        assert_eq!(
            request.verification.as_ref().unwrap_err(),
            "Signature does not match"
        );
    }

    #[tokio::test]
    async fn test_should_flag_unsigned_request() {
        let server = MockServer::start().await.unwrap();
        server.mock("/api/v1/ping", MockResponse::json(StatusCode::OK, "{}"));

        let url = format!("{}ping", server.base_url());
        let status = reqwest::get(&url).await.unwrap().status();
        assert_eq!(status, StatusCode::OK);

        let request = &server.requests()[0];
        assert!(request.verification.is_err());
    }

    #[tokio::test]
    async fn test_should_sign_concurrent_requests_independently() {
        let server = MockServer::start().await.unwrap();
        server.mock("/api/v1/item", MockResponse::json(StatusCode::OK, "{}"));
        let client = server.client();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let client = client.clone();
                tokio::spawn(async move {
                    client
                        .send(
                            None,
                            Method::POST,
                            "item",
                            &NoParams,
                            Some(&json!({ "Id": i })),
                            None::<&mut ()>,
                        )
                        .await
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let requests = server.requests();
        assert_eq!(requests.len(), 8);
        assert!(requests.iter().all(|r| r.verification.is_ok()));
    }
}
