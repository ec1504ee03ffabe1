//! Process configuration.
//!
//! Every setting can be given as a flag or through the environment.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

/// Default listen port.
const DEFAULT_PORT: u16 = 8080;

/// Errors in an otherwise parseable configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Directory endpoint is empty
    #[error("API endpoint must be provided via --api or RADIO_API_ENDPOINT")]
    MissingEndpoint,

    /// Only one half of the TLS pair was supplied
    #[error("both certificate and key are required for HTTPS")]
    IncompleteTls,
}

/// Certificate and key paths for HTTPS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsPaths {
    pub cert: PathBuf,
    pub key: PathBuf,
}

/// Gateway configuration.
#[derive(Debug, Clone, Parser)]
#[command(name = "radio-gateway", about = "Internet radio directory and stream relay")]
pub struct Config {
    /// Radio stations directory endpoint
    #[arg(long = "api", env = "RADIO_API_ENDPOINT")]
    pub api_endpoint: String,

    /// Port to listen on
    #[arg(long, env = "RADIO_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Path to TLS certificate file (PEM)
    #[arg(long = "cert", env = "RADIO_SSL_CERT")]
    pub ssl_cert: Option<PathBuf>,

    /// Path to TLS private key file (PEM)
    #[arg(long = "key", env = "RADIO_SSL_KEY")]
    pub ssl_key: Option<PathBuf>,
}

impl Config {
    /// Check constraints clap cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_endpoint.trim().is_empty() {
            return Err(ConfigError::MissingEndpoint);
        }
        self.tls().map(|_| ())
    }

    /// TLS paths, if HTTPS is enabled.
    ///
    /// HTTPS is enabled only when both a certificate and a key are given.
    pub fn tls(&self) -> Result<Option<TlsPaths>, ConfigError> {
        match (&self.ssl_cert, &self.ssl_key) {
            (Some(cert), Some(key)) => Ok(Some(TlsPaths {
                cert: cert.clone(),
                key: key.clone(),
            })),
            (None, None) => Ok(None),
            _ => Err(ConfigError::IncompleteTls),
        }
    }

    /// Address to bind: all interfaces on the configured port.
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Config, clap::Error> {
        Config::try_parse_from(std::iter::once("radio-gateway").chain(args.iter().copied()))
    }

    #[test]
    fn defaults() {
        let config = parse(&["--api", "http://directory.example/stations"]).unwrap();

        assert_eq!(config.api_endpoint, "http://directory.example/stations");
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.tls(), Ok(None));
        assert!(config.validate().is_ok());
        assert_eq!(config.listen_addr(), "0.0.0.0:8080".parse().unwrap());
    }

    #[test]
    fn tls_requires_both_files() {
        let config = parse(&["--api", "http://d", "--cert", "cert.pem", "--key", "key.pem"]).unwrap();
        assert_eq!(
            config.tls(),
            Ok(Some(TlsPaths {
                cert: "cert.pem".into(),
                key: "key.pem".into(),
            }))
        );

        let config = parse(&["--api", "http://d", "--cert", "cert.pem"]).unwrap();
        assert_eq!(config.validate(), Err(ConfigError::IncompleteTls));
    }

    #[test]
    fn blank_endpoint_is_rejected() {
        let config = parse(&["--api", "  "]).unwrap();
        assert_eq!(config.validate(), Err(ConfigError::MissingEndpoint));
    }

    #[test]
    fn custom_port() {
        let config = parse(&["--api", "http://d", "--port", "9000"]).unwrap();
        assert_eq!(config.listen_addr().port(), 9000);
    }
}
