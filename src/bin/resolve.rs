//! run the resolution pipeline on a text passage and print the result bundle
//! as JSON

use std::sync::Arc;

use pfasmatch::binding::FileBindingSource;
use pfasmatch::config::Config;
use pfasmatch::oracle::OpenAiOracle;
use pfasmatch::resolve::AssetStore;
use pfasmatch::Pipeline;

#[tokio::main]
async fn main() {
    env_logger::init();

    let args: Vec<_> = std::env::args().collect();
    if args.len() < 3 {
        eprintln!("Usage: resolve <config.toml> <text>");
        std::process::exit(1);
    }
    let cfg = Config::load(&args[1]);

    let api_key = std::env::var(&cfg.oracle.api_key_env).unwrap_or_else(|_| {
        panic!("{} must be set in the environment", cfg.oracle.api_key_env)
    });
    let oracle = OpenAiOracle::new(&cfg.oracle, api_key).unwrap();

    let pipeline = Pipeline::new(
        Arc::new(oracle),
        AssetStore::new(&cfg.asset_dir),
        Arc::new(FileBindingSource::new(&cfg.binding_dir)),
        cfg.oracle.max_concurrent,
    );

    match pipeline.resolve_text(&args[2]).await {
        Ok(res) => println!("{}", serde_json::to_string_pretty(&res).unwrap()),
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    }
}
