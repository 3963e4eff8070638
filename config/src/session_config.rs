use crate::{
    connection_params::ConnectionParams,
    VideoPreset,
};

/// Everything a room session needs to bootstrap, resolved from [`super::Config`].
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub params: ConnectionParams,
    pub adaptive_stream: bool,
    pub dynacast: bool,
    pub video_preset: VideoPreset,
}

impl SessionConfig {
    pub fn new(config: &super::Config) -> Self {
        let from_link = config
            .url
            .as_ref()
            .map(ConnectionParams::from_url)
            .unwrap_or_default();
        let explicit = ConnectionParams {
            token: config.token.clone().filter(|token| !token.is_empty()),
            server_url: config.server_url.clone(),
        };

        Self {
            params: from_link.merge(explicit),
            adaptive_stream: config.adaptive_stream,
            dynacast: config.dynacast,
            video_preset: config.video_preset,
        }
    }

    pub fn with_params(params: ConnectionParams) -> Self {
        Self {
            params,
            adaptive_stream: true,
            dynacast: true,
            video_preset: VideoPreset::default(),
        }
    }
}
