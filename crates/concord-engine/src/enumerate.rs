//! Current-state enumeration.

use concord_api::PlatformClient;
use concord_core::RemoteResource;

use crate::error::EngineError;

/// List the scope's current named resources. Empty scopes are fine.
pub fn list(client: &PlatformClient, scope_id: &str) -> Result<Vec<RemoteResource>, EngineError> {
    let resources = client.list_resources(scope_id)?;
    tracing::debug!(scope = %scope_id, count = resources.len(), "enumerated remote resources");
    Ok(resources)
}
