//! Successful exchanges through the reqwest transport.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use aktiva_client::{ErrorKind, NoParams};
    use http::{Method, StatusCode};
    use parking_lot::Mutex;
    use serde::Deserialize;
    use serde_json::json;

    use crate::{MockResponse, MockServer};

    #[derive(Debug, Default, PartialEq, Deserialize)]
    struct Customer {
        #[serde(rename = "CustomerId")]
        customer_id: String,
        #[serde(rename = "Name")]
        name: String,
    }

    #[tokio::test]
    async fn test_should_decode_success_body() {
        let server = MockServer::start().await.unwrap();
        server.mock(
            "/api/v1/getcustomers",
            MockResponse::json(
                StatusCode::OK,
                r#"[{"CustomerId":"c-1","Name":"Acme"},{"CustomerId":"c-2","Name":"Globex"}]"#,
            ),
        );

        let mut customers: Vec<Customer> = Vec::new();
        let response = server
            .client()
            .send(
                None,
                Method::POST,
                "getcustomers",
                &NoParams,
                Some(&json!({})),
                Some(&mut customers),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(customers.len(), 2);
        assert_eq!(customers[1].name, "Globex");
    }

    #[tokio::test]
    async fn test_should_keep_destination_on_no_content() {
        let server = MockServer::start().await.unwrap();
        server.mock(
            "/api/v1/deletecustomer",
            MockResponse::json(StatusCode::NO_CONTENT, ""),
        );

        let mut customer = Customer {
            customer_id: "c-1".to_owned(),
            name: "Acme".to_owned(),
        };
        server
            .client()
            .send(
                None,
                Method::POST,
                "deletecustomer",
                &NoParams,
                Some(&json!({"Id": "c-1"})),
                Some(&mut customer),
            )
            .await
            .unwrap();

        assert_eq!(customer.name, "Acme");
    }

    #[tokio::test]
    async fn test_should_leave_body_on_response_without_destination() {
        let server = MockServer::start().await.unwrap();
        server.mock(
            "/api/v1/raw",
            MockResponse::json(StatusCode::OK, r#"{"anything":true}"#),
        );

        let client = server.client();
        let uri = client.endpoint_url("raw", &NoParams).unwrap();
        let request = client
            .new_request(None, Method::GET, &uri, None::<&()>)
            .unwrap();
        let response = client.execute(&request).await.unwrap();

        assert_eq!(response.body().as_ref(), br#"{"anything":true}"#);
    }

    #[tokio::test]
    async fn test_should_reject_unknown_fields_only_when_strict() {
        let server = MockServer::start().await.unwrap();
        server.mock(
            "/api/v1/getcustomer",
            MockResponse::json(
                StatusCode::OK,
                r#"{"CustomerId":"c-1","Name":"Acme","VatRegNo":"EE100"}"#,
            ),
        );
        let client = server.client();

        let mut customer = Customer::default();
        client
            .send(
                None,
                Method::GET,
                "getcustomer",
                &NoParams,
                None::<&()>,
                Some(&mut customer),
            )
            .await
            .unwrap();
        assert_eq!(customer.customer_id, "c-1");

        let err = client
            .with_strict_decoding(true)
            .send(
                None,
                Method::GET,
                "getcustomer",
                &NoParams,
                None::<&()>,
                Some(&mut Customer::default()),
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
        assert_eq!(err.to_string(), "unknown field `VatRegNo`");
        assert_eq!(err.response().unwrap().status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_should_report_completed_requests() {
        let server = MockServer::start().await.unwrap();
        server.mock("/api/v1/ping", MockResponse::json(StatusCode::OK, "{}"));

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let client = server
            .client()
            .with_debug(true)
            .with_request_completed(move |request, response| {
                counter.fetch_add(1, Ordering::SeqCst);
                sink.lock()
                    .push((request.uri().path().to_owned(), response.status()));
            });

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

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            seen.lock().as_slice(),
            &[("/api/v1/ping".to_owned(), StatusCode::OK)]
        );
    }
}
