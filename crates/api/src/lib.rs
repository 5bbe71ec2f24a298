//! HTTP API: server, routing, and request/response mapping.
//!
//! Request handling is layered: [`middleware::resolve_tenant`] turns the
//! `X-Tenant-Id` header into a [`context::TenantContext`], and
//! [`middleware::require_principal`] turns a bearer access token into a
//! [`context::PrincipalContext`] after checking it belongs to that tenant.
//! Handlers act only through these contexts; the scope they derive is what
//! keeps every store call tenant-confined.

pub mod app;
pub mod authz;
pub mod context;
pub mod middleware;
