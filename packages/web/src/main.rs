use api::settings::StorageKind;
use api::{Backend, Settings};
use time::Duration;
use tower_http::trace::TraceLayer;
use tower_sessions::cookie::SameSite;
use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::PostgresStore;
use tracing_subscriber::EnvFilter;

mod error;
mod routes;
mod views;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = Settings::new()?;
    let session_ttl = settings.session.inactivity();

    match settings.storage {
        StorageKind::Postgres => {
            let pool = api::db::connect(&settings.database).await?;

            // Cookie sessions live next to the application tables
            let session_store = PostgresStore::new(pool.clone());
            session_store.migrate().await?;

            let store = api::db::PgStore::new(pool, session_ttl);
            serve(&settings, store, session_store).await
        }
        StorageKind::Memory => {
            tracing::warn!("Using in-memory storage, all data is lost on restart");
            serve(
                &settings,
                store::MemoryStore::new().with_session_ttl(session_ttl),
                tower_sessions::MemoryStore::default(),
            )
            .await
        }
    }
}

async fn serve<S, C>(settings: &Settings, store: S, session_store: C) -> anyhow::Result<()>
where
    S: Backend,
    C: tower_sessions::SessionStore + Clone,
{
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(settings.session.secure_cookie)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(Duration::days(
            settings.session.inactivity_days,
        )));

    let router = routes::router(store)
        .layer(session_layer)
        .layer(TraceLayer::new_for_http());

    let addr = settings.server.address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router).await?;
    Ok(())
}
