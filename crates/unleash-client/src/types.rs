//! Wire schemas of the admin API.
//!
//! Nullable or optional payload fields are [`Field`]s so absent, `null` and
//! present stay distinct in both directions. Response structs tolerate
//! unknown fields; only what the adapters map is modelled.

use crate::field::Field;
use serde::{Deserialize, Serialize};

// =============================================================================
// Users
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub username: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub email: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub name: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub root_role: Field<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUser {
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub username: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub email: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub name: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub password: Field<String>,
    pub root_role: i64,
    pub send_email: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUser {
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub name: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub email: Field<String>,
    pub root_role: i64,
}

/// `GET /user-admin/search?q=`; entries are summaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSearch {
    #[serde(default)]
    pub users: Vec<User>,
}

// =============================================================================
// Projects
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub description: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub mode: Field<String>,
}

/// `GET /projects`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectList {
    #[serde(default)]
    pub projects: Vec<Project>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProject {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub description: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub mode: Field<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProject {
    pub name: String,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub description: Field<String>,
}

/// `PUT /projects/{id}/settings`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSettings {
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub mode: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub feature_naming: Field<FeatureNaming>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub link_templates: Field<Vec<LinkTemplate>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureNaming {
    pub pattern: String,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub example: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub description: Field<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkTemplate {
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub title: Field<String>,
    pub url_template: String,
}

// =============================================================================
// Project access
// =============================================================================

/// `PUT /projects/{id}/access`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectAccessConfig {
    pub roles: Vec<RoleMembers>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleMembers {
    pub id: i64,
    #[serde(default)]
    pub users: Vec<i64>,
    #[serde(default)]
    pub groups: Vec<i64>,
}

/// `GET /projects/{id}/access`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectAccess {
    #[serde(default)]
    pub roles: Vec<AccessRole>,
    #[serde(default)]
    pub users: Vec<AccessMember>,
    #[serde(default)]
    pub groups: Vec<AccessMember>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessRole {
    pub id: i64,
    #[serde(default)]
    pub name: String,
}

/// A user or group with the roles it holds in a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessMember {
    pub id: i64,
    #[serde(default)]
    pub roles: Vec<i64>,
}

// =============================================================================
// Roles and permissions
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub role_type: String,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub description: Field<String>,
    #[serde(default)]
    pub permissions: Vec<PermissionRef>,
}

/// `GET /roles`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleList {
    #[serde(default)]
    pub roles: Vec<Role>,
}

/// Create and update responses wrap the role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleEnvelope {
    pub roles: Role,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertRole {
    pub name: String,
    #[serde(rename = "type")]
    pub role_type: String,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub description: Field<String>,
    pub permissions: Vec<PermissionRef>,
}

/// A permission granted by a role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PermissionRef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub environment: Field<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Permission {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(rename = "type", default)]
    pub permission_type: String,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub environment: Field<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentPermissions {
    pub name: String,
    #[serde(default)]
    pub permissions: Vec<Permission>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PermissionTiers {
    #[serde(default)]
    pub root: Vec<Permission>,
    #[serde(default)]
    pub project: Vec<Permission>,
    #[serde(default)]
    pub environments: Vec<EnvironmentPermissions>,
}

/// `GET /permissions`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PermissionList {
    pub permissions: PermissionTiers,
}

// =============================================================================
// API tokens
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiToken {
    pub secret: String,
    #[serde(default)]
    pub token_name: String,
    #[serde(rename = "type", default)]
    pub token_type: String,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub environment: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub project: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub projects: Field<Vec<String>>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub expires_at: Field<String>,
}

/// `GET /api-tokens`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiTokenList {
    #[serde(default)]
    pub tokens: Vec<ApiToken>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateApiToken {
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub token_name: Field<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Field::is_absent")]
    pub token_type: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub environment: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub project: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub projects: Field<Vec<String>>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub expires_at: Field<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateApiToken {
    pub expires_at: String,
}

// =============================================================================
// Service accounts
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceAccount {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub name: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub username: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub root_role: Field<i64>,
}

/// `GET /service-account`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceAccountList {
    #[serde(default)]
    pub service_accounts: Vec<ServiceAccount>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateServiceAccount {
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub username: Field<String>,
    pub name: String,
    pub root_role: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateServiceAccount {
    pub name: String,
    pub root_role: i64,
}

/// A service account token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pat {
    pub id: i64,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub expires_at: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub secret: Field<String>,
}

/// `GET /service-account/{id}/token`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatList {
    #[serde(default)]
    pub pats: Vec<Pat>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePat {
    pub description: String,
    pub expires_at: String,
}

// =============================================================================
// Context fields
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextField {
    pub name: String,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub description: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub stickiness: Field<bool>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub legal_values: Field<Vec<LegalValue>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegalValue {
    pub value: String,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub description: Field<String>,
}

/// Create and update payload; the server replaces the whole field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertContextField {
    pub name: String,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub description: Field<String>,
    pub stickiness: bool,
    pub legal_values: Vec<LegalValue>,
}

// =============================================================================
// Environments
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Environment {
    pub name: String,
    #[serde(rename = "type")]
    pub environment_type: String,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub enabled: Field<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateEnvironment {
    pub name: String,
    #[serde(rename = "type")]
    pub environment_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateEnvironment {
    #[serde(rename = "type")]
    pub environment_type: String,
}

/// `POST /projects/{id}/environments`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttachEnvironment {
    pub environment: String,
}

/// One entry of `GET /projects/{id}/change-requests/config`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeRequestConfig {
    pub environment: String,
    #[serde(default)]
    pub change_request_enabled: bool,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub required_approvals: Field<i64>,
}

/// `PUT /projects/{id}/environments/{env}/change-requests/config`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateChangeRequestConfig {
    pub change_requests_enabled: bool,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub required_approvals: Field<i64>,
}

// =============================================================================
// Single sign-on settings
// =============================================================================

/// `GET`/`POST /auth/oidc/settings`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OidcSettings {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub discover_url: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub client_id: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub secret: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub auto_create: Field<bool>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub default_root_role_id: Field<i64>,
}

/// `GET`/`POST /auth/saml/settings`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SamlSettings {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub entity_id: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub sign_on_url: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub certificate: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub auto_create: Field<bool>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub default_root_role_id: Field<i64>,
}

// =============================================================================
// Groups
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub description: Field<String>,
    #[serde(rename = "mappingsSSO", default, skip_serializing_if = "Field::is_absent")]
    pub mappings_sso: Field<Vec<String>>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub root_role: Field<i64>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub users: Field<Vec<GroupUser>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupUser {
    pub user: UserRef,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRef {
    pub id: i64,
}

/// Create and update payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertGroup {
    pub name: String,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub description: Field<String>,
    #[serde(rename = "mappingsSSO")]
    pub mappings_sso: Vec<String>,
    #[serde(default, skip_serializing_if = "Field::is_absent")]
    pub root_role: Field<i64>,
    pub users: Vec<GroupUser>,
}
