use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub listen: ListenConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    /// JSON file with the initial movies. The bundled seed is used when unset.
    #[serde(default)]
    pub seed: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ListenConfig {
    #[serde(default = "default_address")]
    pub address: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CorsConfig {
    #[serde(alias = "allowedorigins", default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: default_allowed_origins(),
        }
    }
}

fn default_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_allowed_origins() -> Vec<String> {
    [
        "http://localhost:8080",
        "http://localhost:3000",
        "http://192.168.0.104:8080",
        "https://movies.com",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(path.to_string(), e))?;

        let config: Config = serde_yaml::from_str(&content)
            .map_err(|e| ConfigError::ParseError(path.to_string(), e))?;

        Ok(config)
    }

    /// Defaults, then the optional config file, then the value of `PORT`,
    /// then the command line port. Later sources win.
    pub fn load_with(
        path: Option<&str>,
        env_port: Option<String>,
        cli_port: Option<u16>,
    ) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_port_env(env_port)?;
        if let Some(port) = cli_port {
            config.listen.port = port;
        }
        Ok(config)
    }

    pub fn apply_port_env(&mut self, value: Option<String>) -> Result<(), ConfigError> {
        match value.as_deref().map(str::trim) {
            None | Some("") => Ok(()),
            Some(port) => {
                self.listen.port = port
                    .parse()
                    .map_err(|_| ConfigError::InvalidPort(port.to_string()))?;
                Ok(())
            }
        }
    }

    pub fn is_origin_allowed(&self, origin: &str) -> bool {
        self.cors.allowed_origins.iter().any(|o| o == origin)
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let addr = format!("{}:{}", self.listen.address, self.listen.port);
        addr.parse().map_err(|_| ConfigError::InvalidAddress(addr))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {0}: {1}")]
    ReadError(String, std::io::Error),
    #[error("Failed to parse config file {0}: {1}")]
    ParseError(String, serde_yaml::Error),
    #[error("Invalid port number: {0}")]
    InvalidPort(String),
    #[error("Invalid listen address: {0}")]
    InvalidAddress(String),
}
