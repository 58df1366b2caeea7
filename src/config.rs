//! Command-line and environment configuration.
//!
//! Every flag can also come from the environment (`HOST`, `PORT`,
//! `PUBLIC_DIR`); flags win over environment, environment wins over the
//! defaults.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use clap::Parser;
use tokio::net::lookup_host;

use crate::error::Error;

/// Server configuration.
#[derive(Clone, Debug, Parser)]
#[command(name = "usuarios")]
#[command(about = "In-memory user directory over a JSON REST API", long_about = None)]
#[command(version)]
pub struct Config {
    /// Host or IP address to bind to
    #[arg(short = 'H', long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Directory served for paths outside the API
    #[arg(long, env = "PUBLIC_DIR", default_value = "public")]
    pub public_dir: PathBuf,
}

impl Config {
    /// Resolves host and port into the socket address to bind.
    ///
    /// IP literals (IPv4 or bare IPv6 such as `::1`) are used as given;
    /// anything else is looked up and the first address wins.
    pub async fn addr(&self) -> Result<SocketAddr, Error> {
        if let Ok(ip) = self.host.parse::<IpAddr>() {
            return Ok(SocketAddr::new(ip, self.port));
        }
        lookup_host((self.host.as_str(), self.port))
            .await
            .map_err(|source| Error::Resolve { host: self.host.clone(), source })?
            .next()
            .ok_or_else(|| Error::NoAddress(self.host.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv6Addr;

    fn parse(args: &[&str]) -> Config {
        Config::try_parse_from(std::iter::once("usuarios").chain(args.iter().copied())).unwrap()
    }

    #[tokio::test]
    async fn ipv4_literal() {
        let config = parse(&["--port", "8080", "-H", "127.0.0.1"]);
        assert_eq!(config.addr().await.unwrap(), "127.0.0.1:8080".parse().unwrap());
    }

    #[tokio::test]
    async fn bare_ipv6_literal() {
        let config = parse(&["-H", "::1", "-p", "3000"]);
        assert_eq!(config.addr().await.unwrap(), SocketAddr::new(Ipv6Addr::LOCALHOST.into(), 3000));
    }

    #[tokio::test]
    async fn hostname_is_resolved() {
        let config = parse(&["-H", "localhost", "-p", "3000"]);
        let addr = config.addr().await.unwrap();
        assert!(addr.ip().is_loopback());
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn rejects_out_of_range_port() {
        assert!(Config::try_parse_from(["usuarios", "--port", "70000"]).is_err());
    }
}
