//! Integration tests for risky-user listing and risk dismissal using wiremock.

use entra_ops::auth::StaticHeaderProvider;
use entra_ops::client::GraphClient;
use entra_ops::error::GraphError;
use entra_ops::identity_protection::*;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Helper: creates an authenticated GraphClient pointed at the given wiremock server.
async fn mock_client(server: &MockServer) -> GraphClient {
    let client = GraphClient::with_base_url(&server.uri()).unwrap();
    client
        .authenticate(&StaticHeaderProvider::bearer("mock-token"), "t", "c", "s")
        .await
        .unwrap();
    client
}

// ── get_risky_users ────────────────────────────────────────────────────

#[tokio::test]
async fn get_risky_users_sends_exact_filter_and_select() {
    let server = MockServer::start().await;
    let client = mock_client(&server).await;

    Mock::given(method("GET"))
        .and(path("/identityProtection/riskyUsers"))
        .and(query_param(
            "$filter",
            "(RiskState eq 'atRisk' or RiskState eq 'confirmedCompromised') and (RiskLevel eq 'high' or RiskLevel eq 'medium')",
        ))
        .and(query_param(
            "$select",
            "RiskLevel,RiskState,UserPrincipalName,RiskLastUpdatedDateTime",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "value": [
                {
                    "riskLevel": "high",
                    "riskState": "atRisk",
                    "userPrincipalName": "alice@contoso.com",
                    "riskLastUpdatedDateTime": "2024-05-01T08:00:00Z"
                },
                {
                    "riskLevel": "medium",
                    "riskState": "confirmedCompromised",
                    "userPrincipalName": "bob@contoso.com",
                    "riskLastUpdatedDateTime": "2024-05-02T09:30:00Z"
                }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let risky = get_risky_users(&client).await.unwrap();
    assert_eq!(risky.len(), 2);
    assert_eq!(risky[0].user_principal_name.as_deref(), Some("alice@contoso.com"));
    assert_eq!(
        risky[1].risk_last_updated_date_time.as_deref(),
        Some("2024-05-02T09:30:00Z")
    );

    // Each projected record carries exactly the two triage keys.
    let projected = serde_json::to_value(&risky[0]).unwrap();
    let keys: Vec<&String> = projected.as_object().unwrap().keys().collect();
    assert_eq!(keys, ["riskLastUpdatedDateTime", "userPrincipalName"]);
}

#[tokio::test]
async fn get_risky_users_empty_is_success() {
    let server = MockServer::start().await;
    let client = mock_client(&server).await;

    Mock::given(method("GET"))
        .and(path("/identityProtection/riskyUsers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "value": []
        })))
        .mount(&server)
        .await;

    assert!(get_risky_users(&client).await.unwrap().is_empty());
}

#[tokio::test]
async fn get_risky_users_missing_field_is_parse_error() {
    let server = MockServer::start().await;
    let client = mock_client(&server).await;

    Mock::given(method("GET"))
        .and(path("/identityProtection/riskyUsers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "value": [{"userPrincipalName": "carol@contoso.com", "riskLevel": "high"}]
        })))
        .mount(&server)
        .await;

    let err = get_risky_users(&client).await.unwrap_err();
    assert!(matches!(err, GraphError::Parse(_)), "got {err:?}");
}

#[tokio::test]
async fn get_risky_users_null_upn_does_not_hide_other_records() {
    let server = MockServer::start().await;
    let client = mock_client(&server).await;

    Mock::given(method("GET"))
        .and(path("/identityProtection/riskyUsers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "value": [
                {"userPrincipalName": "alice@contoso.com", "riskLastUpdatedDateTime": "2024-05-01T08:00:00Z"},
                {"userPrincipalName": null, "riskLastUpdatedDateTime": "2024-05-03T11:15:00Z"}
            ]
        })))
        .mount(&server)
        .await;

    let risky = get_risky_users(&client).await.unwrap();
    assert_eq!(risky.len(), 2);
    assert_eq!(risky[0].user_principal_name.as_deref(), Some("alice@contoso.com"));
    assert!(risky[1].user_principal_name.is_none());
    assert_eq!(
        risky[1].risk_last_updated_date_time.as_deref(),
        Some("2024-05-03T11:15:00Z")
    );
}

#[tokio::test]
async fn get_risky_users_forbidden_returns_api_error() {
    let server = MockServer::start().await;
    let client = mock_client(&server).await;

    Mock::given(method("GET"))
        .and(path("/identityProtection/riskyUsers"))
        .respond_with(ResponseTemplate::new(403).set_body_string("Forbidden: P2 license required"))
        .mount(&server)
        .await;

    let err = get_risky_users(&client).await.unwrap_err();
    assert_eq!(err.status_code(), Some(403));
    assert_eq!(err.message(), "Forbidden: P2 license required");
}

// ── dismiss_user_risk ──────────────────────────────────────────────────

#[tokio::test]
async fn dismiss_by_upn_resolves_id_first() {
    let server = MockServer::start().await;
    let client = mock_client(&server).await;

    Mock::given(method("GET"))
        .and(path("/users/alice@example.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "87d349ed-44d7-43e1-9a83-5f2406dee5bd",
            "userPrincipalName": "alice@example.com"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/identityProtection/riskyUsers/dismiss"))
        .and(body_json(serde_json::json!({
            "userIds": ["87d349ed-44d7-43e1-9a83-5f2406dee5bd"]
        })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    dismiss_user_risk(&client, "alice@example.com").await.unwrap();
}

#[tokio::test]
async fn dismiss_by_guest_upn_looks_up_encoded_path() {
    let server = MockServer::start().await;
    let client = mock_client(&server).await;

    Mock::given(method("GET"))
        .and(path("/users/alice_contoso.com%23EXT%23@fabrikam.onmicrosoft.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "5d1b2b0e-guest",
            "userPrincipalName": "alice_contoso.com#EXT#@fabrikam.onmicrosoft.com"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/identityProtection/riskyUsers/dismiss"))
        .and(body_json(serde_json::json!({"userIds": ["5d1b2b0e-guest"]})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    dismiss_user_risk(&client, "alice_contoso.com#EXT#@fabrikam.onmicrosoft.com")
        .await
        .unwrap();
}

#[tokio::test]
async fn dismiss_by_upn_without_id_never_posts() {
    let server = MockServer::start().await;
    let client = mock_client(&server).await;

    Mock::given(method("GET"))
        .and(path("/users/alice@example.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "userPrincipalName": "alice@example.com"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/identityProtection/riskyUsers/dismiss"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let err = dismiss_user_risk(&client, "alice@example.com")
        .await
        .unwrap_err();
    assert!(matches!(err, GraphError::UnresolvedUser { .. }));
    assert_eq!(err.status_code(), Some(400));
}

#[tokio::test]
async fn dismiss_by_upn_lookup_failure_propagates() {
    let server = MockServer::start().await;
    let client = mock_client(&server).await;

    Mock::given(method("GET"))
        .and(path("/users/ghost@example.com"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/identityProtection/riskyUsers/dismiss"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let err = dismiss_user_risk(&client, "ghost@example.com")
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), Some(404));
}

#[tokio::test]
async fn dismiss_by_object_id_skips_lookup() {
    let server = MockServer::start().await;
    let client = mock_client(&server).await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .expect(0)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/identityProtection/riskyUsers/dismiss"))
        .and(body_json(serde_json::json!({"userIds": ["00000000-guid"]})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    dismiss_user_risk(&client, "00000000-guid").await.unwrap();
}

#[tokio::test]
async fn dismiss_rejects_200() {
    let server = MockServer::start().await;
    let client = mock_client(&server).await;

    Mock::given(method("POST"))
        .and(path("/identityProtection/riskyUsers/dismiss"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&server)
        .await;

    let err = dismiss_user_risk(&client, "u-9").await.unwrap_err();
    assert_eq!(err.status_code(), Some(200));
    assert_eq!(err.message(), "ok");
}
