use std::net::SocketAddr;

use anyhow::Context;
use axum::extract::{DefaultBodyLimit, Path, State};
use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use maud::Markup;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config;
use crate::controllers::paste;
use crate::db::Database;
use crate::extract::{Json, Now};
use crate::render::paste_page;
use crate::types::api::{CreatePaste, CreatedPaste, Health, ViewedPaste};
use crate::App;

pub async fn run(app: App) -> anyhow::Result<()> {
    let addr = SocketAddr::new(app.config.bind, app.config.port);
    let router = router(app)?;

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("listening on {addr}");

    axum::serve(listener, router).await?;

    Ok(())
}

pub fn router(app: App) -> anyhow::Result<Router> {
    let cors = cors_layer(&app.config.cors)?;

    Ok(Router::new()
        .route("/api/healthz", get(healthz))
        .route("/api/pastes", post(create_paste))
        .route("/api/pastes/:id", get(get_paste_json))
        .route("/p/:id", get(get_paste_html))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(app.config.limits.max_upload_size))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(app))
}

fn cors_layer(config: &config::Cors) -> anyhow::Result<CorsLayer> {
    let origins = config
        .allowed_origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin).with_context(|| format!("invalid CORS origin '{origin}'"))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true))
}

async fn healthz(State(db): State<Database>) -> crate::ApiResult<axum::Json<Health>> {
    db.ping().await?;
    Ok(axum::Json(Health { ok: true }))
}

async fn create_paste(
    State(app): State<App>,
    Json(input): Json<CreatePaste>,
) -> crate::ApiResult<axum::Json<CreatedPaste>> {
    let paste = paste::create(&app, input).await?;
    Ok(axum::Json(paste.into()))
}

async fn get_paste_json(
    State(app): State<App>,
    Now(now): Now,
    Path(id): Path<String>,
) -> crate::ApiResult<axum::Json<ViewedPaste>> {
    let paste = paste::view(&app, &id, now).await?;
    Ok(axum::Json(paste.into()))
}

async fn get_paste_html(
    State(app): State<App>,
    Now(now): Now,
    Path(id): Path<String>,
) -> crate::ApiResult<Markup> {
    let paste = paste::view(&app, &id, now).await?;
    Ok(paste_page(&paste))
}
