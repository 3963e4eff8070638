#[macro_use]
extern crate tracing;

mod app_config;
mod args;
mod connection_params;
mod session_config;
mod video_preset;

use app_config::{
    AppConfig,
    ENV_PREFIX,
};
use config::builder::{
    ConfigBuilder,
    DefaultState,
};
pub use app_config::{
    get_config_dir,
    get_data_dir,
};
pub use args::Args;
pub use connection_params::{
    ConnectionParams,
    SERVER_PARAMS,
    TOKEN_PARAM,
};
use serde::Deserialize;
pub use session_config::SessionConfig;
use std::{
    fmt,
    path::Path,
};
pub use video_preset::{
    VideoPreset,
    VideoPresetIter,
    VideoPresetSpec,
};

#[derive(Clone, Deserialize)]
pub struct Config {
    #[serde(flatten)]
    pub app_config: AppConfig,
    /// Room link carrying `token` and `ws` / `serverUrl` in its query string.
    #[serde(default)]
    pub url: Option<url::Url>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub server_url: Option<url::Url>,
    #[serde(default)]
    pub video_preset: VideoPreset,
    #[serde(default = "enabled")]
    pub adaptive_stream: bool,
    #[serde(default = "enabled")]
    pub dynacast: bool,
    #[serde(default)]
    pub debug: bool,
}

fn enabled() -> bool {
    true
}

const DEFAULT_CONFIG: &str = include_str!("default-config.yaml");

impl Default for Config {
    fn default() -> Self {
        serde_yml::from_str(DEFAULT_CONFIG).expect("Failed to parse default config")
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("app_config", &self.app_config)
            .field("url", &self.url.as_ref().map(|url| url.origin().unicode_serialization()))
            .field("token_len", &self.token.as_ref().map(String::len))
            .field("server_url", &self.server_url.as_ref().map(url::Url::as_str))
            .field("video_preset", &self.video_preset)
            .field("adaptive_stream", &self.adaptive_stream)
            .field("dynacast", &self.dynacast)
            .field("debug", &self.debug)
            .finish()
    }
}

impl Config {
    /// Layers the embedded defaults, `config.yaml` in the config directory,
    /// `ROOM_CLIENT_*` environment variables and finally the command line.
    pub fn new(args: Args) -> Result<Self, config::ConfigError> {
        let mut builder = Self::defaults()?;

        let config_files = [("config.yaml", config::FileFormat::Yaml)];

        for (file, format) in &config_files {
            let source = config::File::from(get_config_dir().join(file))
                .format(*format)
                .required(false);
            builder = builder.add_source(source);
        }

        builder = builder.add_source(config::Environment::with_prefix(ENV_PREFIX));
        Self::with_args(builder, args)
    }

    /// The directories and the embedded defaults, without anything read from
    /// the user's machine.
    fn defaults() -> Result<ConfigBuilder<DefaultState>, config::ConfigError> {
        let data_dir = get_data_dir();
        let config_dir = get_config_dir();
        Ok(config::Config::builder()
            .set_default("data_dir", data_dir.to_string_lossy().to_string())?
            .set_default("config_dir", config_dir.to_string_lossy().to_string())?
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Yaml)))
    }

    fn with_args(builder: ConfigBuilder<DefaultState>, args: Args) -> Result<Self, config::ConfigError> {
        let cfg: Self = builder.add_source(args).build()?.try_deserialize()?;
        debug!(config = ?cfg, "Loaded configuration");

        Ok(cfg)
    }

    pub fn data_dir(&self) -> &Path {
        &self.app_config.data_dir
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig::new(self)
    }
}
