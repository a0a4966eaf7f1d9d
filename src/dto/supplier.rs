use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::entities::supplier;

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct SupplierRequest {
    /// Must be absent on create and match the path on update
    pub id: Option<String>,
    #[validate(length(max = 255))]
    #[schema(example = "Acme Components")]
    pub name: String,
    #[validate(length(max = 255))]
    pub contact_name: Option<String>,
    #[validate(length(max = 64))]
    pub phone: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub created_by: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SupplierResponse {
    pub id: String,
    pub name: String,
    pub contact_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

impl From<supplier::Model> for SupplierResponse {
    fn from(model: supplier::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            contact_name: model.contact_name,
            phone: model.phone,
            email: model.email,
            created_by: model.created_by,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct SupplierSearchParams {
    #[serde(default)]
    pub name: String,
}
