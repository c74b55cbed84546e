use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use role_registry::config::HttpConfig;
use role_registry::models::permission::Permission;
use role_registry::models::role::{PatchOperation, Role, RoleChanges, RoleCreateRequest};
use role_registry::routes;
use role_registry::session::{SessionIdentity, SessionState};
use role_registry::{app, db};

#[derive(OpenApi)]
#[openapi(
    paths(
        routes::roles::list_permissions,
        routes::roles::get_role,
        routes::roles::list_roles,
        routes::roles::create_role,
        routes::roles::patch_role,
        routes::roles::delete_role,
        routes::session::get_session,
        routes::health::health,
    ),
    components(
        schemas(
            Role,
            RoleCreateRequest,
            PatchOperation,
            RoleChanges,
            Permission,
            SessionState,
            SessionIdentity,
            routes::health::HealthResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Roles", description = "Role management"),
        (name = "Permissions", description = "Permission catalog"),
        (name = "Session", description = "Session state materialization"),
        (name = "Health", description = "Liveness")
    )
)]
struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};

        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearerAuth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_env();
    init_tracing();

    let pool = db::init().await?;
    let http = HttpConfig::from_env()?;
    let app = app::create_app(pool, http).await?;

    let app = app.merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    let port = std::env::var("APP_PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8000);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

fn load_env() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    let crate_env = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join(".env");
    let _ = dotenvy::from_path(crate_env);
}

fn init_tracing() {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false);

    let filter_layer = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();
}
