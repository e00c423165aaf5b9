/// Configuration system
///
/// - `macros`: `config_struct!` for structs with embedded defaults
/// - `schemas`: every config section
/// - `utils`: TOML loading, `COINOPS_*` overrides, validation
pub mod macros;
pub mod schemas;
pub mod utils;

pub use schemas::{
    default_coins, BasicAuthConfig, Config, ConfigSource, FeaturesConfig, IpAllowlistConfig,
    LoggingConfig, PricingConfig, SecurityConfig, ServerConfig, SessionsConfig,
};
pub use utils::{apply_env_overrides, load_config, load_config_from_path, validate_config, CONFIG_FILE_PATH};
