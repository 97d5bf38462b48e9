use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, ToSchema};

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct UserDoc { pub id: String, pub username: String, pub token: String }

#[derive(ToSchema)]
pub struct NewUserDoc { pub username: String, pub token: Option<String> }

#[derive(ToSchema)]
pub struct UserPatchDoc { pub username: Option<String>, pub token: Option<String> }

#[derive(ToSchema)]
pub struct ErrorDoc { pub error: String }

struct BearerScheme;

impl Modify for BearerScheme {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::users::list_users,
        crate::routes::users::retrieve_user,
        crate::routes::users::create_user,
        crate::routes::users::update_user,
        crate::routes::users::delete_user,
    ),
    components(
        schemas(
            HealthResponse,
            UserDoc,
            NewUserDoc,
            UserPatchDoc,
            ErrorDoc,
        )
    ),
    modifiers(&BearerScheme),
    tags(
        (name = "health"),
        (name = "users")
    )
)]
pub struct ApiDoc;
