use admin::SessionGuard;
use anyhow::Context;
use api::ApiState;
use repository::init_repository;
use supabase::{Client, SupabaseConfig, DEFAULT_ANON_KEY, DEFAULT_URL};
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use util::{config_path, get_integer, get_str, load_config_or_default, resolve};

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8000;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = load_config_or_default(&config_path())?;

    let supabase_config = SupabaseConfig {
        url: resolve(
            &["PUBLIC_SUPABASE_URL", "SUPABASE_URL"],
            get_str(&config, "supabase", "url"),
            DEFAULT_URL,
        ),
        anon_key: resolve(
            &["PUBLIC_SUPABASE_ANON_KEY", "SUPABASE_ANON_KEY"],
            get_str(&config, "supabase", "anon_key"),
            DEFAULT_ANON_KEY,
        ),
    };
    info!(task = "configure", supabase_url = supabase_config.url);

    let client = Client::new(&supabase_config)
        .context("failed to build the supabase client")?;

    let repository = init_repository(client.rest());
    let guard = SessionGuard::new(client.auth());
    let subscription = guard.start().await;

    let host = get_str(&config, "server", "host").unwrap_or(DEFAULT_HOST);
    let port = get_integer(&config, "server", "port")
        .map(u16::try_from)
        .transpose()
        .context("server.port is out of range")?
        .unwrap_or(DEFAULT_PORT);

    let listener = TcpListener::bind((host, port))
        .await
        .with_context(|| format!("failed to bind {}:{}", host, port))?;
    info!(task = "listen", addr = %listener.local_addr()?);

    let router = api::serve(ApiState::new(repository, guard));
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    subscription.unsubscribe();
    info!(task = "shutdown");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(task = "shutdown signal", err = e.to_string());
    }
}
