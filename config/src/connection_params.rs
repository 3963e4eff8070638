use std::fmt;
use url::Url;

/// Query parameter carrying the participant's access token.
pub const TOKEN_PARAM: &str = "token";
/// Query parameters carrying the room service address, in order of preference.
pub const SERVER_PARAMS: [&str; 2] = ["ws", "serverUrl"];

/// Where and how to join a room.
///
/// `token` is required to attempt a connection, `server_url` is optional and
/// left to the backend's default when absent.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ConnectionParams {
    pub token: Option<String>,
    pub server_url: Option<Url>,
}

impl ConnectionParams {
    /// Read the parameters from the query string of a room link.
    ///
    /// Empty values count as absent. A server address that does not parse is
    /// dropped with a warning.
    pub fn from_url(url: &Url) -> Self {
        let query_value = |name: &str| {
            url.query_pairs()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.into_owned())
                .filter(|value| !value.is_empty())
        };

        let token = query_value(TOKEN_PARAM);
        let server_url = SERVER_PARAMS
            .iter()
            .find_map(|name| query_value(name))
            .and_then(|value| parse_server_url(&value));

        Self { token, server_url }
    }

    /// Values set in `other` win over the ones in `self`.
    pub fn merge(self, other: ConnectionParams) -> Self {
        Self {
            token: other.token.or(self.token),
            server_url: other.server_url.or(self.server_url),
        }
    }

    pub fn has_token(&self) -> bool {
        self.token.as_deref().is_some_and(|token| !token.is_empty())
    }
}

pub(crate) fn parse_server_url(value: &str) -> Option<Url> {
    match Url::parse(value) {
        Ok(url) => Some(url),
        Err(err) => {
            warn!(value, "Ignoring invalid server address: {err}");
            None
        }
    }
}

impl fmt::Debug for ConnectionParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print the token itself.
        f.debug_struct("ConnectionParams")
            .field("token_len", &self.token.as_ref().map(String::len))
            .field("server_url", &self.server_url.as_ref().map(Url::as_str))
            .finish()
    }
}
