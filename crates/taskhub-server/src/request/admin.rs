//! Administration request bodies.

use super::extract::RequestRules;
use crate::response::PaginationParams;
use serde::Deserialize;
use taskhub_auth::Role;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateRoleRequest {
    pub role: Role,
}

impl RequestRules for UpdateRoleRequest {}

impl RequestRules for PaginationParams {}
