//! Group membership lookup.
//!
//! Only direct members are returned, and only the first page Graph sends
//! back (100 objects by default). Members without a `displayName` (some
//! service principals and devices) are skipped.

use serde_json::Value;

use crate::client::GraphClient;
use crate::users::ODataList;

/// Display names of a group's direct members, in the order Graph lists them.
///
/// # Errors
///
/// - `GraphError::Api` — any status other than 200 (404 for an unknown group).
/// - `GraphError::Parse` — the body was not JSON.
/// - `GraphError::Network` — transport-level failure.
pub async fn get_group_users(
    client: &GraphClient,
    group_id: &str,
) -> crate::error::Result<Vec<String>> {
    let list: ODataList<Value> = client.get(&["groups", group_id, "members"]).await?;
    Ok(list.display_names())
}
