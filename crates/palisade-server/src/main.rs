use palisade_server::config::loader;
use palisade_server::{ServerBuilder, bootstrap, observability};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    observability::init_tracing();

    let args: Vec<String> = std::env::args().collect();
    let source = loader::resolve_source(args.get(1).map(String::as_str));
    let config = match loader::load(&source) {
        Ok(config) => config,
        Err(err) => {
            tracing::error!("{err}");
            std::process::exit(2);
        }
    };
    tracing::info!("✓ Configuration loaded from {source}");
    observability::apply_logging_level(&config.logging.level);

    let server = ServerBuilder::new()
        .with_config(config)
        .build()
        .await
        .map_err(|err| anyhow::anyhow!(err))?;
    bootstrap::ensure_admin(&server.state().users, &server.state().config.bootstrap).await;

    server.run().await
}
