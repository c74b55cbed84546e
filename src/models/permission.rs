use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// An entry of the permission catalog. Permission ids are opaque capability
/// strings; roles reference them without a foreign key so the catalog can be
/// extended independently.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Permission {
    #[schema(example = "ROLE_CREATE")]
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}
