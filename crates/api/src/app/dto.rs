use chrono::{DateTime, Utc};
use serde::Deserialize;

use stockroom_catalog::{Category, CategoryId, Product, ProductId, ProductVariant, UnitId, UnitOfMeasure};
use stockroom_core::Tenant;
use stockroom_inventory::StockMovement;
use stockroom_parties::Party;
use stockroom_store::AuthSession;

use crate::context::{PrincipalContext, TenantContext};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTenantRequest {
    pub name: String,
    pub domain: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub full_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertCategoryRequest {
    pub name: String,
    pub parent_id: Option<CategoryId>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertUnitRequest {
    pub code: String,
    pub name: String,
    pub precision: Option<i16>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertProductRequest {
    pub sku: String,
    pub name: String,
    pub description: Option<String>,
    pub category_id: Option<CategoryId>,
    pub unit_id: UnitId,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertVariantRequest {
    pub sku: Option<String>,
    pub barcode: Option<String>,
    pub attributes: Option<serde_json::Value>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertPartyRequest {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMovementRequest {
    pub product_id: ProductId,
    pub quantity_delta: i64,
    pub note: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementListQuery {
    pub product_id: Option<ProductId>,
}

// -------------------------
// JSON mapping helpers
// -------------------------

fn utc(at: DateTime<Utc>) -> String {
    at.to_rfc3339()
}

pub fn session_to_json(session: &AuthSession) -> serde_json::Value {
    serde_json::json!({
        "accessToken": session.access.token,
        "refreshToken": session.refresh.token,
        "expiresAtUtc": utc(session.access.expires_at),
    })
}

pub fn me_to_json(tenant: &TenantContext, principal: &PrincipalContext) -> serde_json::Value {
    serde_json::json!({
        "userId": principal.user_id().to_string(),
        "email": principal.email(),
        "roles": principal.roles(),
        "tenantId": tenant.tenant_id().to_string(),
    })
}

pub fn tenant_to_json(tenant: &Tenant) -> serde_json::Value {
    serde_json::json!({
        "id": tenant.id.to_string(),
        "name": tenant.name,
        "domain": tenant.domain,
        "isActive": tenant.active,
        "createdAt": utc(tenant.audit.created_at),
        "updatedAt": tenant.audit.updated_at.map(utc),
    })
}

pub fn category_to_json(category: &Category) -> serde_json::Value {
    serde_json::json!({
        "id": category.id.to_string(),
        "name": category.name,
        "parentId": category.parent_id.map(|id| id.to_string()),
        "createdAt": utc(category.audit.created_at),
        "updatedAt": category.audit.updated_at.map(utc),
    })
}

pub fn unit_to_json(unit: &UnitOfMeasure) -> serde_json::Value {
    serde_json::json!({
        "id": unit.id.to_string(),
        "code": unit.code,
        "name": unit.name,
        "precision": unit.precision,
        "createdAt": utc(unit.audit.created_at),
        "updatedAt": unit.audit.updated_at.map(utc),
    })
}

pub fn product_to_json(product: &Product) -> serde_json::Value {
    serde_json::json!({
        "id": product.id.to_string(),
        "sku": product.sku,
        "name": product.name,
        "description": product.description,
        "categoryId": product.category_id.map(|id| id.to_string()),
        "unitId": product.unit_id.to_string(),
        "isActive": product.active,
        "createdAt": utc(product.audit.created_at),
        "updatedAt": product.audit.updated_at.map(utc),
    })
}

pub fn variant_to_json(variant: &ProductVariant) -> serde_json::Value {
    serde_json::json!({
        "id": variant.id.to_string(),
        "productId": variant.product_id.to_string(),
        "sku": variant.sku,
        "barcode": variant.barcode,
        "attributes": variant.attributes,
        "isActive": variant.active,
        "createdAt": utc(variant.audit.created_at),
        "updatedAt": variant.audit.updated_at.map(utc),
    })
}

pub fn party_to_json(party: &Party) -> serde_json::Value {
    serde_json::json!({
        "id": party.id.to_string(),
        "kind": party.kind.to_string(),
        "name": party.name,
        "email": party.email,
        "phone": party.phone,
        "createdAt": utc(party.audit.created_at),
        "updatedAt": party.audit.updated_at.map(utc),
    })
}

pub fn movement_to_json(movement: &StockMovement) -> serde_json::Value {
    serde_json::json!({
        "id": movement.id.to_string(),
        "productId": movement.product_id.to_string(),
        "quantityDelta": movement.quantity_delta,
        "note": movement.note,
        "createdAt": utc(movement.audit.created_at),
    })
}
