/*
 * Responsibility
 * - Config 読み込み → 依存生成 → Router 組み立て
 * - Middleware の適用 (v1 に authenticator、全体に HTTP 系 layer)
 * - axum::serve() で起動し、ctrl-c で停止
 */
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::{
    api,
    config::{AppEnv, Config},
    middleware,
    repos::{
        CommentStore, CredentialStore, InMemoryBoardRepo, InMemoryUserRepo, PgCommentRepo,
        PgPostRepo, PgUserRepo, PostStore,
    },
    services::{
        auth::{AuthError, AuthService, Role, build_auth_service},
        board::BoardService,
        id_codec::IdCodec,
    },
    state::AppState,
};

pub async fn run() -> Result<()> {
    init_tracing();

    let config = Config::from_env()?;
    init_panic_hook(config.app_env);
    info!(addr = %config.addr, env = ?config.app_env, "starting board-api");

    let state = build_state(&config).await?;
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    info!(addr = %listener.local_addr()?, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tower_http=info"));

    // 2 回目の init (テスト) はエラー扱いしない
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

fn init_panic_hook(app_env: AppEnv) {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        tracing::error!(panic = %info, "panic");
        default_hook(info);
        if !app_env.is_production() {
            std::process::abort();
        }
    }));
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

pub async fn build_state(config: &Config) -> Result<AppState> {
    let (users, posts, comments): (
        Arc<dyn CredentialStore>,
        Arc<dyn PostStore>,
        Arc<dyn CommentStore>,
    ) = match &config.database_url {
        Some(url) => {
            let pool = PgPoolOptions::new()
                .max_connections(10)
                .connect(url)
                .await
                .context("connect to postgres")?;
            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .context("run migrations")?;
            info!("using postgres store");
            (
                Arc::new(PgUserRepo::new(pool.clone())),
                Arc::new(PgPostRepo::new(pool.clone())),
                Arc::new(PgCommentRepo::new(pool)),
            )
        }
        None => {
            warn!("DATABASE_URL not set, using in-memory store (data is lost on restart)");
            let board = Arc::new(InMemoryBoardRepo::new());
            (Arc::new(InMemoryUserRepo::new()), board.clone(), board)
        }
    };

    let id_codec = IdCodec::new(config.sqids_min_length, &config.sqids_alphabet)?;
    let auth = build_auth_service(config, users)?;
    seed_admin(config, &auth).await?;

    let board = Arc::new(BoardService::new(posts, comments));
    Ok(AppState::new(auth, board, id_codec))
}

async fn seed_admin(config: &Config, auth: &AuthService) -> Result<()> {
    let Some(admin) = &config.bootstrap_admin else {
        return Ok(());
    };

    match auth.register(&admin.email, &admin.password, Role::Admin).await {
        Ok(()) => info!(email = %admin.email, "bootstrap admin created"),
        Err(AuthError::DuplicateIdentity) => {
            info!(email = %admin.email, "bootstrap admin already present")
        }
        Err(e) => return Err(anyhow::Error::new(e).context("seed bootstrap admin")),
    }
    Ok(())
}

pub fn build_router(state: AppState, config: &Config) -> Router {
    let v1 = middleware::auth::access::apply(api::v1::routes(), state.clone());

    let app = Router::new().nest("/api/v1", v1).with_state(state);
    middleware::http::apply(app, config)
}
