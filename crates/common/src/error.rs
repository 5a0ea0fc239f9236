use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModuleError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("User-id submodule '{submodule}' error: {message}")]
    Submodule { submodule: String, message: String },

    #[error("Bid adapter '{adapter}' error: {message}")]
    Adapter { adapter: String, message: String },

    #[error("Identity vendor '{vendor}' unavailable: {message}")]
    Vendor { vendor: String, message: String },
}

pub type Result<T> = std::result::Result<T, ModuleError>;
