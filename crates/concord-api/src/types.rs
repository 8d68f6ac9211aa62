use serde::{Deserialize, Serialize};

/// The authenticated identity behind a credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Principal {
    pub id: String,
    pub display_name: String,
}

/// One scope the principal has access to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScopeMembership {
    pub id: String,
    pub name: String,
}
