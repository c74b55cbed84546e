use anyhow::{Context, Result};
use axum::body::{self, Body};
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use serde_json::{json, Value};
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::SqlitePool;
use tempfile::tempdir;
use tower::util::ServiceExt;
use uuid::Uuid;

use role_registry::jwt::JwtConfig;
use role_registry::{create_app, HttpConfig};

async fn setup(db_name: &str) -> Result<(Router, JwtConfig, tempfile::TempDir)> {
    let dir = tempdir().context("failed to create tempdir")?;
    let db_path = dir.path().join(db_name);
    let opts = SqliteConnectOptions::new()
        .filename(db_path.as_path())
        .create_if_missing(true);
    let pool = SqlitePool::connect_with(opts).await?;

    let migrator = sqlx::migrate::Migrator::new(
        std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("migrations"),
    )
    .await?;
    migrator.run(&pool).await?;

    std::env::set_var("JWT_SECRET", "test-secret");
    let app = create_app(pool, HttpConfig::default()).await?;
    let jwt = JwtConfig::from_env()?;

    Ok((app, jwt, dir))
}

async fn read_json(resp: Response) -> Result<Value> {
    let bytes = body::to_bytes(resp.into_body(), 1_048_576).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

async fn create_role(app: &Router, token: &str, label: &str, permissions: &[&str]) -> Result<String> {
    let req = Request::builder()
        .method("POST")
        .uri("/roles")
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::from(
            json!({"label": label, "sysPermission": permissions}).to_string(),
        ))?;
    let resp = app.clone().oneshot(req).await?;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created = read_json(resp).await?;
    Ok(created
        .get("id")
        .and_then(|v| v.as_str())
        .context("missing role id")?
        .to_string())
}

async fn get_session(app: &Router, token: Option<&str>) -> Result<Response> {
    let mut builder = Request::builder().method("GET").uri("/session");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    Ok(app.clone().oneshot(builder.body(Body::empty())?).await?)
}

#[tokio::test]
async fn session_carries_role_set_and_permission_table() -> Result<()> {
    let (app, jwt, _dir) = setup("session_table.db").await?;

    let admin_token = jwt.encode(Uuid::new_v4(), Vec::new())?;
    let r1 = create_role(&app, &admin_token, "writer", &["p1", "p2"]).await?;
    let r2 = create_role(&app, &admin_token, "reviewer", &["p2", "p3"]).await?;

    let user_id = Uuid::new_v4();
    let token = jwt.encode(user_id, vec![r1.clone(), r2.clone()])?;
    let resp = get_session(&app, Some(&token)).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let session = read_json(resp).await?;

    let identity = session.get("identity").context("identity attached")?;
    assert_eq!(
        identity.get("id").and_then(|v| v.as_str()),
        Some(user_id.to_string().as_str())
    );

    let roles = identity
        .get("sysResourceRole")
        .and_then(|v| v.as_array())
        .context("role set attached")?;
    assert_eq!(roles.len(), 2);
    assert!(roles.iter().any(|r| r.as_str() == Some(r1.as_str())));
    assert!(roles.iter().any(|r| r.as_str() == Some(r2.as_str())));

    // the table is exactly the deduplicated union
    assert_eq!(
        identity.get("sysPermissionTable"),
        Some(&json!({"p1": true, "p2": true, "p3": true}))
    );

    Ok(())
}

#[tokio::test]
async fn roleless_principal_gets_no_role_or_table_keys() -> Result<()> {
    let (app, jwt, _dir) = setup("session_roleless.db").await?;

    let token = jwt.encode(Uuid::new_v4(), Vec::new())?;
    let resp = get_session(&app, Some(&token)).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let session = read_json(resp).await?;

    let identity = session.get("identity").context("identity attached")?;
    assert!(identity.get("sysResourceRole").is_none());
    assert!(identity.get("sysPermissionTable").is_none());

    Ok(())
}

#[tokio::test]
async fn anonymous_session_is_empty() -> Result<()> {
    let (app, _jwt, _dir) = setup("session_anon.db").await?;

    let resp = get_session(&app, None).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let session = read_json(resp).await?;
    assert_eq!(session, json!({}));

    Ok(())
}

#[tokio::test]
async fn dangling_role_assignment_fails_materialization() -> Result<()> {
    let (app, jwt, _dir) = setup("session_dangling.db").await?;

    let admin_token = jwt.encode(Uuid::new_v4(), Vec::new())?;
    let r1 = create_role(&app, &admin_token, "writer", &["p1"]).await?;

    // the second assigned role was never created (or has been deleted)
    let token = jwt.encode(Uuid::new_v4(), vec![r1, "deleted-role".to_string()])?;
    let resp = get_session(&app, Some(&token)).await?;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn table_reflects_role_changes_on_next_materialization() -> Result<()> {
    let (app, jwt, _dir) = setup("session_recompute.db").await?;

    let admin_token = jwt.encode(Uuid::new_v4(), Vec::new())?;
    let role_id = create_role(&app, &admin_token, "writer", &["p1", "p2"]).await?;
    let token = jwt.encode(Uuid::new_v4(), vec![role_id.clone()])?;

    let resp = get_session(&app, Some(&token)).await?;
    let session = read_json(resp).await?;
    assert_eq!(
        session["identity"]["sysPermissionTable"],
        json!({"p1": true, "p2": true})
    );

    // shrink the role's permission set
    let envelope = json!([{"op": "updateRole", "changes": {"sysPermission": ["p1"]}}]);
    let req = Request::builder()
        .method("PATCH")
        .uri(format!("/roles/{}", role_id))
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {}", admin_token))
        .body(Body::from(envelope.to_string()))?;
    let resp = app.clone().oneshot(req).await?;
    assert_eq!(resp.status(), StatusCode::OK);

    // the table is recomputed per materialization, not cached across requests
    let resp = get_session(&app, Some(&token)).await?;
    let session = read_json(resp).await?;
    assert_eq!(session["identity"]["sysPermissionTable"], json!({"p1": true}));

    Ok(())
}
