//! HTTP surface for the PFAS adsorber match service. the handlers are thin
//! wrappers around the resolution pipeline in the library crate

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use clap::Parser;
use log::info;

use pfasmatch::binding::FileBindingSource;
use pfasmatch::config::Config;
use pfasmatch::oracle::OpenAiOracle;
use pfasmatch::resolve::AssetStore;
use pfasmatch::Pipeline;

mod handlers;

use handlers::AppState;

#[derive(Parser)]
struct Cli {
    /// The path to the TOML configuration file.
    #[arg(short, long, default_value = "server.toml")]
    config: String,

    /// Override the bind address from the configuration file.
    #[arg(short, long)]
    addr: Option<String>,
}

#[tokio::main]
async fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let cfg = Config::load(&cli.config);

    let api_key = std::env::var(&cfg.oracle.api_key_env).unwrap_or_else(|_| {
        panic!("{} must be set in the environment", cfg.oracle.api_key_env)
    });
    let oracle = OpenAiOracle::new(&cfg.oracle, api_key).unwrap();

    let assets = AssetStore::new(&cfg.asset_dir);
    let bindings = FileBindingSource::new(&cfg.binding_dir);
    let pipeline = Pipeline::new(
        Arc::new(oracle),
        assets.clone(),
        Arc::new(bindings),
        cfg.oracle.max_concurrent,
    );
    let state = Arc::new(AppState { pipeline, assets });

    let app = Router::new()
        .route("/", get(handlers::index))
        .route("/smiles", post(handlers::smiles_from_text))
        .route("/render2d", post(handlers::render_2d))
        .route("/render3d", post(handlers::render_3d))
        .route("/text2imagefiles", post(handlers::images_from_text))
        .with_state(state);

    let addr = cli.addr.unwrap_or(cfg.addr);
    info!("serving on http://{addr}");
    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
