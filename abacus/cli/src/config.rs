use {
    serde::Deserialize,
    std::{collections::BTreeMap, path::PathBuf},
    url::Url,
};

#[derive(Deserialize, Debug)]
pub struct Config {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// JSON file holding the deployment record of every domain.
    pub deployments: PathBuf,
    /// Where to write verification inputs, one file per chain.
    #[serde(default)]
    pub verification_dir: Option<PathBuf>,
    #[serde(default)]
    pub format: ReportFormat,
    /// RPC endpoints keyed by chain name, replacing those in the deployment
    /// records.
    #[serde(default)]
    pub rpc_urls: BTreeMap<String, Url>,
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}
