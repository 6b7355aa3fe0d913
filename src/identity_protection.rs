//! Identity Protection risk triage.
//!
//! - [`get_risky_users`] lists accounts currently at risk (or confirmed
//!   compromised) with a high or medium risk level.
//! - [`dismiss_user_risk`] clears the risk state for one account, resolving
//!   a UPN to its object ID first because the dismiss action only accepts IDs.
//!
//! Both endpoints need `IdentityRiskyUser.ReadWrite.All`.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::client::GraphClient;
use crate::error::GraphError;
use crate::users::{UserRef, get_user};

/// Server-side filter: at-risk or compromised accounts with high or medium risk.
pub const RISKY_USERS_FILTER: &str = "(RiskState eq 'atRisk' or RiskState eq 'confirmedCompromised') and (RiskLevel eq 'high' or RiskLevel eq 'medium')";

/// Fields requested from Graph for each risky user.
pub const RISKY_USERS_SELECT: &str = "RiskLevel,RiskState,UserPrincipalName,RiskLastUpdatedDateTime";

/// A risky user reduced to the two fields triage needs.
///
/// Both keys must be present in the Graph record; a missing key is a
/// parse error rather than a defaulted value. Either may be `null`, which
/// is carried through so one sparse record does not hide the rest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskyUser {
    /// UPN of the flagged account.
    #[serde(deserialize_with = "Option::deserialize")]
    pub user_principal_name: Option<String>,
    /// When the risk state last changed (ISO 8601).
    #[serde(deserialize_with = "Option::deserialize")]
    pub risk_last_updated_date_time: Option<String>,
}

/// `{"value": [...]}` with `value` required.
#[derive(Debug, Deserialize)]
struct RiskyUserPage {
    value: Vec<RiskyUser>,
}

/// Request body for POST `/identityProtection/riskyUsers/dismiss`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DismissRequest {
    /// Object IDs whose risk is dismissed.
    pub user_ids: Vec<String>,
}

/// Lists high/medium risk users that are at risk or confirmed compromised.
///
/// An empty result is a success, not an error.
///
/// # Errors
///
/// - `GraphError::Api` — any status other than 200.
/// - `GraphError::Parse` — `value` is missing, or a record lacks
///   `userPrincipalName` or `riskLastUpdatedDateTime`.
/// - `GraphError::Network` — transport-level failure.
pub async fn get_risky_users(client: &GraphClient) -> crate::error::Result<Vec<RiskyUser>> {
    let page: RiskyUserPage = client
        .get_with_query(
            &["identityProtection", "riskyUsers"],
            &[("$filter", RISKY_USERS_FILTER), ("$select", RISKY_USERS_SELECT)],
        )
        .await?;
    debug!(count = page.value.len(), "fetched risky users");
    Ok(page.value)
}

/// Dismisses the risk for one user, given a UPN or object ID.
///
/// A UPN costs one extra `get_user` call. If that user object has no
/// `id`, the dismiss request is never sent.
///
/// # Errors
///
/// - `GraphError::UnresolvedUser` — the UPN lookup returned no `id` (400).
/// - `GraphError::Api` — the lookup or the dismiss call returned an
///   unexpected status (the dismiss expects 204).
/// - `GraphError::Network` — transport-level failure.
pub async fn dismiss_user_risk(
    client: &GraphClient,
    user_identifier: &str,
) -> crate::error::Result<()> {
    let user_id = match UserRef::parse(user_identifier) {
        UserRef::Upn(upn) => resolve_user_id(client, &upn).await?,
        UserRef::ObjectId(id) => id,
    };

    let body = DismissRequest {
        user_ids: vec![user_id.clone()],
    };
    client
        .post(
            &["identityProtection", "riskyUsers", "dismiss"],
            Some(&body),
            StatusCode::NO_CONTENT,
        )
        .await?;
    info!(%user_id, "dismissed user risk");
    Ok(())
}

async fn resolve_user_id(client: &GraphClient, upn: &str) -> crate::error::Result<String> {
    let user = get_user(client, upn).await?;
    match user.get("id").and_then(|id| id.as_str()) {
        Some(id) if !id.is_empty() => Ok(id.to_string()),
        _ => Err(GraphError::UnresolvedUser {
            upn: upn.to_string(),
        }),
    }
}
