//! User account and authentication-method operations.
//!
//! Every function here addresses `/users/{user}[...]`, where `user` is
//! either a User Principal Name or a directory object ID. Graph accepts
//! both in the same position. Identifiers are percent-encoded as a single
//! path segment, so guest UPNs containing `#EXT#` address the right user.
//!
//! ## Endpoints
//!
//! | Function | API Path | Success |
//! |----------|----------|---------|
//! | [`get_user`] | GET `/users/{id}` | 200 |
//! | [`get_user_groups`] | GET `/users/{id}/memberOf` | 200 |
//! | [`disable_account`] / [`enable_account`] | PATCH `/users/{id}` | 204 |
//! | [`revoke_sign_in_sessions`] | POST `/users/{id}/microsoft.graph.revokeSignInSessions` | 200 |
//! | [`list_auth_methods`] | GET `/users/{id}/authentication/methods` | 200 |
//! | [`list_authenticator_app_methods`] | GET `/users/{id}/authentication/microsoftAuthenticatorMethods` | 200 |
//! | [`remove_auth_method`] | DELETE `/users/{id}/authentication/{kind}/{method_id}` | 204 |
//!
//! ## Permissions
//!
//! Reads need `User.Read.All`; account changes need `User.EnableDisableAccount.All`;
//! authentication methods need `UserAuthenticationMethod.ReadWrite.All`.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::client::GraphClient;

// ── Shared types ───────────────────────────────────────────────────────

/// A user as accepted by the risk-dismissal endpoint, which needs an
/// object ID rather than a UPN.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserRef {
    /// User Principal Name, e.g. `alice@contoso.com`.
    Upn(String),
    /// Directory object ID.
    ObjectId(String),
}

impl UserRef {
    /// Classifies an identifier: anything containing `@` is a UPN.
    pub fn parse(identifier: &str) -> Self {
        if identifier.contains('@') {
            UserRef::Upn(identifier.to_string())
        } else {
            UserRef::ObjectId(identifier.to_string())
        }
    }
}

/// OData collection wrapper returned by list endpoints.
///
/// `value` defaults to empty when Graph omits it.
#[derive(Debug, Deserialize)]
pub struct ODataList<T> {
    /// The array of result items.
    #[serde(default)]
    pub value: Vec<T>,
}

impl ODataList<Value> {
    /// Display names of the listed directory objects, in order.
    ///
    /// Entries without a string `displayName` are skipped. That includes
    /// entries whose `displayName` key is present but `null`: they are
    /// dropped rather than kept as an empty placeholder.
    pub fn display_names(&self) -> Vec<String> {
        self.value
            .iter()
            .filter_map(|entry| entry.get("displayName").and_then(Value::as_str))
            .map(str::to_owned)
            .collect()
    }
}

/// PATCH body toggling sign-in for an account.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountEnabledUpdate {
    /// `false` blocks sign-in, `true` allows it.
    pub account_enabled: bool,
}

/// Authentication method collections that support deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMethodKind {
    /// Microsoft Authenticator app registration.
    MicrosoftAuthenticator,
    /// Phone number for SMS or voice verification.
    Phone,
    /// FIDO2 security key or passkey.
    Fido2,
    /// Email address used for self-service password reset.
    Email,
    /// Third-party software OATH token.
    SoftwareOath,
    /// Time-limited temporary access pass.
    TemporaryAccessPass,
}

impl AuthMethodKind {
    /// Collection segment under `/authentication/`.
    pub fn path_segment(self) -> &'static str {
        match self {
            AuthMethodKind::MicrosoftAuthenticator => "microsoftAuthenticatorMethods",
            AuthMethodKind::Phone => "phoneMethods",
            AuthMethodKind::Fido2 => "fido2Methods",
            AuthMethodKind::Email => "emailMethods",
            AuthMethodKind::SoftwareOath => "softwareOathMethods",
            AuthMethodKind::TemporaryAccessPass => "temporaryAccessPassMethods",
        }
    }
}

// ── Lookups ────────────────────────────────────────────────────────────

/// Retrieves a user object by UPN or ID, as returned by Graph.
///
/// # Errors
///
/// - `GraphError::Api` — any status other than 200 (404 for an unknown user).
/// - `GraphError::Parse` — the body was not JSON.
/// - `GraphError::Network` — transport-level failure.
pub async fn get_user(client: &GraphClient, user: &str) -> crate::error::Result<Value> {
    client.get(&["users", user]).await
}

/// Display names of the groups (and directory roles) a user is a direct
/// member of.
pub async fn get_user_groups(client: &GraphClient, user: &str) -> crate::error::Result<Vec<String>> {
    let list: ODataList<Value> = client.get(&["users", user, "memberOf"]).await?;
    Ok(list.display_names())
}

// ── Account state ──────────────────────────────────────────────────────

async fn set_account_enabled(
    client: &GraphClient,
    user: &str,
    enabled: bool,
) -> crate::error::Result<()> {
    let body = AccountEnabledUpdate {
        account_enabled: enabled,
    };
    client
        .patch(&["users", user], &body, StatusCode::NO_CONTENT)
        .await?;
    info!(user, enabled, "updated accountEnabled");
    Ok(())
}

/// Blocks sign-in for the account. Expects 204.
pub async fn disable_account(client: &GraphClient, user: &str) -> crate::error::Result<()> {
    set_account_enabled(client, user, false).await
}

/// Re-enables sign-in for the account. Expects 204.
pub async fn enable_account(client: &GraphClient, user: &str) -> crate::error::Result<()> {
    set_account_enabled(client, user, true).await
}

/// Invalidates all refresh tokens and session cookies issued to the user.
///
/// Graph answers this action with 200 and a small body, which is discarded.
pub async fn revoke_sign_in_sessions(client: &GraphClient, user: &str) -> crate::error::Result<()> {
    client
        .post::<()>(
            &["users", user, "microsoft.graph.revokeSignInSessions"],
            None,
            StatusCode::OK,
        )
        .await?;
    info!(user, "revoked sign-in sessions");
    Ok(())
}

// ── Authentication methods ─────────────────────────────────────────────

/// All registered authentication methods for the user.
pub async fn list_auth_methods(client: &GraphClient, user: &str) -> crate::error::Result<Value> {
    client
        .get(&["users", user, "authentication", "methods"])
        .await
}

/// Microsoft Authenticator registrations for the user.
pub async fn list_authenticator_app_methods(
    client: &GraphClient,
    user: &str,
) -> crate::error::Result<Value> {
    client
        .get(&[
            "users",
            user,
            "authentication",
            "microsoftAuthenticatorMethods",
        ])
        .await
}

/// Deletes one registered authentication method. Expects 204.
///
/// # Errors
///
/// - `GraphError::Api` — any status other than 204. Graph returns 400 when
///   removing the user's default method while others remain.
/// - `GraphError::Network` — transport-level failure.
pub async fn remove_auth_method(
    client: &GraphClient,
    user: &str,
    kind: AuthMethodKind,
    method_id: &str,
) -> crate::error::Result<()> {
    let path = [
        "users",
        user,
        "authentication",
        kind.path_segment(),
        method_id,
    ];
    client.delete(&path, StatusCode::NO_CONTENT).await?;
    info!(user, method = kind.path_segment(), method_id, "removed authentication method");
    Ok(())
}

/// Removes a Microsoft Authenticator registration.
pub async fn remove_authenticator_app_method(
    client: &GraphClient,
    user: &str,
    method_id: &str,
) -> crate::error::Result<()> {
    remove_auth_method(client, user, AuthMethodKind::MicrosoftAuthenticator, method_id).await
}

/// Removes a phone (SMS/voice) method.
pub async fn remove_phone_method(
    client: &GraphClient,
    user: &str,
    method_id: &str,
) -> crate::error::Result<()> {
    remove_auth_method(client, user, AuthMethodKind::Phone, method_id).await
}

/// Removes a FIDO2 security key.
pub async fn remove_fido2_method(
    client: &GraphClient,
    user: &str,
    method_id: &str,
) -> crate::error::Result<()> {
    remove_auth_method(client, user, AuthMethodKind::Fido2, method_id).await
}

/// Removes an email method.
pub async fn remove_email_method(
    client: &GraphClient,
    user: &str,
    method_id: &str,
) -> crate::error::Result<()> {
    remove_auth_method(client, user, AuthMethodKind::Email, method_id).await
}

/// Removes a software OATH token.
pub async fn remove_software_oath_method(
    client: &GraphClient,
    user: &str,
    method_id: &str,
) -> crate::error::Result<()> {
    remove_auth_method(client, user, AuthMethodKind::SoftwareOath, method_id).await
}

/// Removes a temporary access pass.
pub async fn remove_temporary_access_pass_method(
    client: &GraphClient,
    user: &str,
    method_id: &str,
) -> crate::error::Result<()> {
    remove_auth_method(client, user, AuthMethodKind::TemporaryAccessPass, method_id).await
}
