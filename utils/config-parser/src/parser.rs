use {
    crate::error::Error,
    config::{Config, Environment, File},
    serde::de::DeserializeOwned,
    std::path::Path,
};

/// Prefix of environment variables that override values from the config file.
/// Nested keys are separated by `__`, e.g. `ABACUS_RPC_URLS__ALFAJORES`.
pub const ENV_PREFIX: &str = "ABACUS";

/// Loads a config file, in any format the `config` crate recognizes by its
/// extension, with overrides taken from the environment.
pub fn parse_config<P, D>(path: P) -> Result<D, Error>
where
    P: AsRef<Path>,
    D: DeserializeOwned,
{
    parse_config_with_prefix(path, ENV_PREFIX)
}

pub fn parse_config_with_prefix<P, D>(path: P, prefix: &str) -> Result<D, Error>
where
    P: AsRef<Path>,
    D: DeserializeOwned,
{
    let path = path.as_ref();

    if !path.exists() {
        return Err(Error::NotFound(path.to_path_buf()));
    }

    let env_override = Environment::with_prefix(prefix)
        .prefix_separator("_")
        .separator("__");

    let config = Config::builder()
        .add_source(File::from(path))
        .add_source(env_override)
        .build()?;

    Ok(config.try_deserialize()?)
}

// ----------------------------------- tests -----------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, serde::Deserialize)]
    struct TestSettings {
        log_level: String,
        deployments: String,
        rpc_urls: std::collections::BTreeMap<String, String>,
    }

    #[test]
    fn parsing_config_file() {
        let config: TestSettings =
            parse_config_with_prefix("fixtures/config_test1.toml", "CONFIG_PARSER_TEST1").unwrap();

        assert_eq!(config.log_level, "info");
        assert_eq!(config.deployments, "deployments/testnet.json");
        assert_eq!(config.rpc_urls["alfajores"], "https://alfajores-forno.celo-testnet.org");
    }

    #[test]
    fn environment_overrides_file() {
        std::env::set_var("CONFIG_PARSER_TEST2_LOG_LEVEL", "debug");
        std::env::set_var("CONFIG_PARSER_TEST2_RPC_URLS__ALFAJORES", "http://localhost:8545");

        let config: TestSettings =
            parse_config_with_prefix("fixtures/config_test1.toml", "CONFIG_PARSER_TEST2").unwrap();

        assert_eq!(config.log_level, "debug");
        assert_eq!(config.rpc_urls["alfajores"], "http://localhost:8545");
    }

    #[test]
    fn missing_file() {
        let err = parse_config::<_, TestSettings>("fixtures/does_not_exist.toml").unwrap_err();

        assert!(matches!(err, Error::NotFound(_)));
    }
}
