use std::fs::read_to_string;
use std::path::Path;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct OracleConfig {
    /// base URL of an OpenAI-compatible chat-completions API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// model to use for both extraction and SMILES generation
    #[serde(default = "default_model")]
    pub model: String,

    /// name of the environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// per-request timeout in seconds; expiry counts as an oracle failure
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// retries after the first failed attempt, with exponential backoff
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// bound on in-flight oracle calls per process
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_owned()
}

fn default_model() -> String {
    "gpt-4o-mini".to_owned()
}

fn default_api_key_env() -> String {
    "OPEN_AI_KEY".to_owned()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    2
}

fn default_max_concurrent() -> usize {
    4
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            max_concurrent: default_max_concurrent(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// directory holding the pre-generated `<stem>.jpg` and
    /// `<stem>_gaff.mol2` files
    #[serde(default = "default_asset_dir")]
    pub asset_dir: String,

    /// directory of per-PFAS binding-affinity tables, one
    /// `<asset_stem>.json` per PFAS
    #[serde(default = "default_binding_dir")]
    pub binding_dir: String,

    /// address the server binds to
    #[serde(default = "default_addr")]
    pub addr: String,

    #[serde(default)]
    pub oracle: OracleConfig,
}

fn default_asset_dir() -> String {
    "images".to_owned()
}

fn default_binding_dir() -> String {
    "data/bindings".to_owned()
}

fn default_addr() -> String {
    "127.0.0.1:8003".to_owned()
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let s = read_to_string(path)
            .unwrap_or_else(|e| panic!("failed to read {path:?} for {e}"));
        toml::from_str(&s)
            .unwrap_or_else(|e| panic!("failed to parse {path:?} for {e}"))
    }
}
