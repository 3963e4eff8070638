use clap::Parser;

/// Join a real-time video room from the terminal.
#[derive(Parser, Debug, Clone, Default)]
#[command(author, version = version(), about, long_about = None)]
pub struct Args {
    /// Room link whose query string carries `token` and optionally `ws` or `serverUrl`,
    /// e.g. `https://meet.example.com/?token=...&ws=wss://rtc.example.com`.
    #[clap(long, value_name = "URL")]
    pub url: Option<String>,

    /// Access token of the participant. Overrides the token of `--url`.
    #[clap(long, value_name = "TOKEN", env = "ROOM_CLIENT_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Address of the room service. Overrides `ws` / `serverUrl` of `--url`.
    #[clap(long = "ws", visible_alias = "server-url", value_name = "URL")]
    pub server_url: Option<String>,

    /// Capture quality of the published camera track (h90 … h2160).
    #[clap(long = "video-preset", value_name = "PRESET")]
    pub video_preset: Option<String>,

    /// Enables debug logging.
    #[clap(long = "debug", action)]
    pub debug: bool,
}

mod config_ext {
    use super::*;
    use config::{
        Map,
        Source,
        Value,
    };
    use std::collections::HashMap;

    impl Source for Args {
        fn clone_into_box(&self) -> Box<dyn Source + Send + Sync> {
            Box::new((*self).clone())
        }

        fn collect(&self) -> Result<Map<String, Value>, config::ConfigError> {
            let mut cache = HashMap::<String, Value>::new();
            if let Some(url) = &self.url {
                cache.insert("url".to_string(), url.clone().into());
            }
            if let Some(token) = &self.token {
                cache.insert("token".to_string(), token.clone().into());
            }
            if let Some(server_url) = &self.server_url {
                cache.insert("server_url".to_string(), server_url.clone().into());
            }
            if let Some(video_preset) = &self.video_preset {
                cache.insert("video_preset".to_string(), video_preset.clone().into());
            }
            if self.debug {
                cache.insert("debug".to_string(), true.into());
            }
            Ok(cache)
        }
    }
}

pub fn version() -> String {
    let author = clap::crate_authors!();
    let config_dir_path = crate::get_config_dir().display().to_string();
    let data_dir_path = crate::get_data_dir().display().to_string();

    format!(
        "\
Authors: {author}

Config directory: {config_dir_path}
Data directory: {data_dir_path}"
    )
}
