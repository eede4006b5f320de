//! OpenAPI documentation configuration.
//!
//! Defines the [`ApiDoc`] aggregate generating the OpenAPI specification for
//! the REST surface: the auth endpoints, the revenue ledger endpoints, and
//! the health probes, plus the request/response schemas they reference.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookies",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "username",
                "Session cookie pair issued by POST /auth/login and /auth/signup.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Revenue ledger API",
        description = "Cookie-authenticated per-user revenue ledger."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookies" = [])),
    paths(
        crate::inbound::http::auth::signup,
        crate::inbound::http::auth::login,
        crate::inbound::http::auth::logout,
        crate::inbound::http::revenue::list_revenue,
        crate::inbound::http::revenue::record_revenue,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        crate::inbound::http::auth::CredentialsRequest,
        crate::inbound::http::revenue::AmountRequest,
        crate::domain::RevenueEntry,
    )),
    tags(
        (name = "auth", description = "Signup, login, and logout"),
        (name = "revenue", description = "Per-user ledger entries"),
        (name = "health", description = "Liveness and readiness probes")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn the_document_lists_every_endpoint() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();
        for expected in [
            "/auth/signup",
            "/auth/login",
            "/auth/logout",
            "/revenue",
            "/health/ready",
            "/health/live",
        ] {
            assert!(
                paths.iter().any(|p| p.as_str() == expected),
                "missing path {expected}"
            );
        }
    }
}
