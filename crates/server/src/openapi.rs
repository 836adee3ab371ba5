use serde::Serialize;
use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(Serialize, ToSchema)]
pub struct ConfigListResponseDoc {
    #[serde(rename = "configFiles")]
    pub config_files: Vec<String>,
}

#[derive(ToSchema)]
pub struct SaveResponseDoc { pub success: bool, pub message: String }

#[derive(ToSchema)]
pub struct ErrorBodyDoc { pub error: String }

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::config::get_config,
        crate::routes::config::post_config,
    ),
    components(
        schemas(
            HealthResponse,
            ConfigListResponseDoc,
            SaveResponseDoc,
            ErrorBodyDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "config")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_config_paths() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/admin/configs"));
        assert!(doc.paths.paths.contains_key("/health"));
    }
}
