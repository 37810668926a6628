//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, cart, health, localisations, material_types, materiels, requests, users};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "LocEHPAD API",
        version = "0.3.0",
        description = "Medical equipment loan tracking for nursing homes",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    modifiers(&SecurityAddon),
    paths(
        // Health
        health::root,
        health::health_check,
        // Auth
        auth::login,
        // Users
        users::list_users,
        users::me,
        users::create_user,
        users::delete_user,
        // Categories
        material_types::list_material_types,
        material_types::create_material_type,
        material_types::update_material_type,
        material_types::delete_material_type,
        // Locations
        localisations::list_localisations,
        localisations::create_localisation,
        localisations::update_localisation,
        localisations::delete_localisation,
        // Equipment
        materiels::list_materiels,
        materiels::create_materiel,
        materiels::update_materiel,
        materiels::delete_materiel,
        // Cart
        cart::get_cart,
        cart::add_item,
        cart::remove_item,
        cart::submit_cart,
        // Requests
        requests::list_requests,
        requests::get_request,
        requests::create_request,
        requests::create_direct_request,
        requests::update_request_status,
        requests::delete_request,
    ),
    components(
        schemas(
            // Auth
            crate::models::user::LoginForm,
            crate::models::user::TokenResponse,
            // Users
            crate::models::user::User,
            crate::models::user::CreateUser,
            // Registries
            crate::models::material_type::MaterialType,
            crate::models::material_type::CreateMaterialType,
            crate::models::localisation::Localisation,
            crate::models::localisation::CreateLocalisation,
            crate::models::materiel::Materiel,
            crate::models::materiel::CreateMateriel,
            // Cart and requests
            crate::models::cart::Cart,
            crate::models::cart::CartItem,
            crate::models::cart::SubmitCartResponse,
            crate::models::request::ServiceRequest,
            crate::models::request::RequestDraft,
            crate::models::request::UpdateRequestStatus,
            crate::models::enums::RequestType,
            crate::models::enums::RequestStatus,
            // Health
            health::HealthResponse,
            health::WelcomeResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "users", description = "User management"),
        (name = "material_types", description = "Equipment categories"),
        (name = "localisations", description = "Facility, room and resident locations"),
        (name = "materiels", description = "Equipment registry"),
        (name = "cart", description = "Request drafts awaiting submission"),
        (name = "requests", description = "Service requests and their status")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
