use crate::error::{Error, ProtocolError, ResponseErrorKind, Result};
use crate::keys::RemoteKey;
use crate::rpc::RpcClient;
use log::{info, warn};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fmt;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 1516;
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
// Pairing waits for someone to accept the prompt on the TV.
pub const DEFAULT_PAIRING_TIMEOUT: Duration = Duration::from_secs(120);

const ACCESS_TOKEN_PARAM: &str = "AccessToken";

mod method {
    pub const CREATE_ACCESS_TOKEN: &str = "createAccessToken";
    pub const REMOTE_KEY_CONTROL: &str = "remoteKeyControl";
    pub const GET_TV_STATES: &str = "getTVStates";
    pub const GET_VIDEO_STATES: &str = "getVideoStates";
    pub const USB_SOURCE_CONTROL: &str = "usbSourceControl";
    pub const RVU_SOURCE_CONTROL: &str = "rvuSourceControl";
    pub const EXTERNAL_SPEAKER_CONTROL: &str = "externalSpeakerControl";
}

#[derive(Clone)]
pub struct ClientConfig {
    pub host: String,
    pub port: u16,
    /// Off by default: TVs ship self-signed certificates.
    pub verify_tls: bool,
    pub access_token: Option<String>,
    pub request_timeout: Duration,
    pub pairing_timeout: Duration,
    endpoint: Option<String>,
}

impl ClientConfig {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_PORT,
            verify_tls: false,
            access_token: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            pairing_timeout: DEFAULT_PAIRING_TIMEOUT,
            endpoint: None,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_verify_tls(mut self, verify: bool) -> Self {
        self.verify_tls = verify;
        self
    }

    pub fn with_access_token(mut self, token: Option<String>) -> Self {
        self.access_token = token;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_pairing_timeout(mut self, timeout: Duration) -> Self {
        self.pairing_timeout = timeout;
        self
    }

    /// Sends requests to `url` instead of `https://host:port/`, e.g. a local
    /// simulator.
    pub fn with_endpoint(mut self, url: impl Into<String>) -> Self {
        self.endpoint = Some(url.into());
        self
    }

    pub fn endpoint(&self) -> String {
        if let Some(url) = &self.endpoint {
            return url.clone();
        }
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("https://[{}]:{}/", self.host, self.port)
        } else {
            format!("https://{}:{}/", self.host, self.port)
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("endpoint", &self.endpoint())
            .field("verify_tls", &self.verify_tls)
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("request_timeout", &self.request_timeout)
            .field("pairing_timeout", &self.pairing_timeout)
            .finish()
    }
}

#[derive(Deserialize)]
struct PairingResult {
    #[serde(rename = "AccessToken", alias = "token")]
    access_token: Option<String>,
}

/// A session with one TV. Owns the HTTPS connection pool; dropping or
/// closing the session releases it.
pub struct SamsungTV {
    rpc: RpcClient,
    access_token: Option<String>,
    request_timeout: Duration,
    pairing_timeout: Duration,
}

impl SamsungTV {
    pub fn connect(config: ClientConfig) -> Result<Self> {
        if !config.verify_tls {
            warn!("TLS certificate verification disabled for {}", config.host);
        }
        let rpc = RpcClient::new(config.endpoint(), config.verify_tls)?;
        info!("opened session to {}", rpc.endpoint());
        Ok(Self {
            rpc,
            access_token: config.access_token,
            request_timeout: config.request_timeout,
            pairing_timeout: config.pairing_timeout,
        })
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    /// Ends the session. Pooled connections are released here.
    pub fn close(self) {
        info!("closed session to {}", self.rpc.endpoint());
    }

    /// Pairs with the TV. The TV shows a prompt and only answers once the
    /// user accepts it, so this may take as long as `pairing_timeout`.
    pub async fn create_access_token(&mut self) -> Result<String> {
        info!("requesting access token, accept the prompt on the TV");
        let result = self
            .rpc
            .call(
                method::CREATE_ACCESS_TOKEN,
                Value::Object(Map::new()),
                self.pairing_timeout,
            )
            .await
            .map_err(|err| match err {
                Error::Response(e) if e.kind == ResponseErrorKind::Unauthorized => {
                    Error::Authentication {
                        message: format!("pairing rejected: {}", e.message),
                        code: Some(e.code),
                    }
                }
                err => err,
            })?;

        let granted = match result {
            Value::String(token) => Some(token),
            other => {
                let pairing: PairingResult = serde_json::from_value(other).map_err(|e| {
                    ProtocolError::Malformed(format!("unexpected pairing result: {e}"))
                })?;
                pairing.access_token
            }
        };
        let token = match granted {
            Some(token) if !token.is_empty() => token,
            _ => return Err(Error::authentication("device did not grant an access token")),
        };
        info!("access token granted");
        self.access_token = Some(token.clone());
        Ok(token)
    }

    pub async fn remote_key_control(&self, key: RemoteKey) -> Result<()> {
        let mut params = Map::new();
        params.insert("remoteKey".to_string(), Value::from(key.as_str()));
        self.call(method::REMOTE_KEY_CONTROL, params).await?;
        Ok(())
    }

    pub async fn get_tv_states(&self) -> Result<Value> {
        self.call(method::GET_TV_STATES, Map::new()).await
    }

    pub async fn get_video_states(&self) -> Result<Value> {
        self.call(method::GET_VIDEO_STATES, Map::new()).await
    }

    /// Attached USB sources. Older firmware answers "Method not found";
    /// see [`Error::is_method_not_found`].
    pub async fn usb_source_control(&self) -> Result<Value> {
        self.call(method::USB_SOURCE_CONTROL, Map::new()).await
    }

    pub async fn rvu_source_control(&self) -> Result<Value> {
        self.call(method::RVU_SOURCE_CONTROL, Map::new()).await
    }

    pub async fn external_speaker_control(&self) -> Result<Value> {
        self.call(method::EXTERNAL_SPEAKER_CONTROL, Map::new()).await
    }

    /// Issues `method` with the session token attached. An unauthorized
    /// answer while no token is held means pairing never happened.
    pub async fn call(&self, method: &str, mut params: Map<String, Value>) -> Result<Value> {
        if let Some(token) = &self.access_token {
            params.insert(ACCESS_TOKEN_PARAM.to_string(), Value::from(token.as_str()));
        }
        let result = self
            .rpc
            .call(method, Value::Object(params), self.request_timeout)
            .await;
        match result {
            Err(Error::Response(e))
                if e.kind == ResponseErrorKind::Unauthorized && self.access_token.is_none() =>
            {
                Err(Error::Authentication {
                    message: format!("no access token for {method}: {}", e.message),
                    code: Some(e.code),
                })
            }
            result => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::tv::*;

    #[test]
    fn test_config_defaults() {
        let config = ClientConfig::new("192.168.1.20");
        assert_eq!(config.port, 1516);
        assert!(!config.verify_tls);
        assert!(config.access_token.is_none());
        assert_eq!(config.endpoint(), "https://192.168.1.20:1516/");
    }

    #[test]
    fn test_config_endpoint() {
        let config = ClientConfig::new("fe80::1").with_port(8443);
        assert_eq!(config.endpoint(), "https://[fe80::1]:8443/");
        let config = ClientConfig::new("tv.local").with_endpoint("http://127.0.0.1:9000/");
        assert_eq!(config.endpoint(), "http://127.0.0.1:9000/");
    }

    #[test]
    fn test_config_debug_redacts_token() {
        let config = ClientConfig::new("tv").with_access_token(Some("secret".to_string()));
        let debug = format!("{config:?}");
        assert!(!debug.contains("secret"));
        assert!(debug.contains("redacted"));
    }

    #[test]
    fn test_pairing_result_aliases() {
        let p: PairingResult = serde_json::from_value(serde_json::json!({"AccessToken": "a"}))
            .unwrap();
        assert_eq!(p.access_token.as_deref(), Some("a"));
        let p: PairingResult =
            serde_json::from_value(serde_json::json!({"token": "b"})).unwrap();
        assert_eq!(p.access_token.as_deref(), Some("b"));
    }
}
