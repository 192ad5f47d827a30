//! Service configuration.
//!
//! The service reads no flags or environment variables; [`ServeConfig`]
//! exists so the fixed defaults live in one place and tests can point the
//! service at fixture artifacts.
//!
//! ```
//! use cardscore::ServeConfig;
//!
//! let config = ServeConfig::builder()
//!     .model_path("fixtures/model.json")
//!     .build()
//!     .unwrap();
//! assert_eq!(config.scaler_path, std::path::Path::new("scaler.json"));
//! ```

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use bon::Builder;

/// Classifier artifact, relative to the working directory.
pub const DEFAULT_MODEL_PATH: &str = "credit_card_model.json";

/// Scaler artifact, relative to the working directory.
pub const DEFAULT_SCALER_PATH: &str = "scaler.json";

pub const DEFAULT_BIND_ADDR: SocketAddr = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 5000);

/// Errors that can occur during configuration validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must not be empty")]
    EmptyPath(&'static str),
}

/// Where to find the artifacts and where to listen.
#[derive(Debug, Clone, Builder)]
#[builder(derive(Clone, Debug), finish_fn(vis = "", name = __build_internal))]
pub struct ServeConfig {
    /// XGBoost JSON model. Default: [`DEFAULT_MODEL_PATH`].
    #[builder(into, default = PathBuf::from(DEFAULT_MODEL_PATH))]
    pub model_path: PathBuf,

    /// Scaler JSON export. Default: [`DEFAULT_SCALER_PATH`].
    #[builder(into, default = PathBuf::from(DEFAULT_SCALER_PATH))]
    pub scaler_path: PathBuf,

    /// Listen address. Default: [`DEFAULT_BIND_ADDR`].
    #[builder(default = DEFAULT_BIND_ADDR)]
    pub bind_addr: SocketAddr,
}

impl<S: serve_config_builder::IsComplete> ServeConfigBuilder<S> {
    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyPath`] if either artifact path is empty.
    pub fn build(self) -> Result<ServeConfig, ConfigError> {
        let config = self.__build_internal();
        config.validate()?;
        Ok(config)
    }
}

impl ServeConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.model_path.as_os_str().is_empty() {
            return Err(ConfigError::EmptyPath("model_path"));
        }
        if self.scaler_path.as_os_str().is_empty() {
            return Err(ConfigError::EmptyPath("scaler_path"));
        }
        Ok(())
    }
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self::builder().__build_internal()
    }
}
