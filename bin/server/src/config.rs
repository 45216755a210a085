use crate::constants::{
    DEFAULT_HOST, DEFAULT_IO_TIMEOUT_SECS, DEFAULT_PORT, DEFAULT_SWEEP_INTERVAL_SECS,
    DEFAULT_UPLOADS_DIR, ENV_HOST, ENV_IO_TIMEOUT_SECS, ENV_PORT, ENV_PUBLIC_URL,
    ENV_SWEEP_INTERVAL_SECS, ENV_UPLOADS, ENV_UPLOADS_DIR, ENV_USER_DATA,
};
use clap::{Arg, ArgMatches, Command};
use std::net::{IpAddr, UdpSocket};
use std::path::PathBuf;
use std::time::Duration;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Drop directory holding uploads and the record files
    pub uploads_dir: PathBuf,
    /// Address other devices on the network should open
    pub public_url: String,
    /// Period between cleanup sweeps
    pub sweep_interval: Duration,
    /// Bound on directory enumeration and archive building
    pub io_timeout: Duration,
}

impl ServerConfig {
    /// Build the configuration from the process arguments and environment.
    /// Priority: command-line args > environment variables > defaults.
    pub fn load() -> Result<Self, std::io::Error> {
        let matches = command().get_matches();
        Self::from_matches(&matches, |key| std::env::var(key).ok())
    }

    fn from_matches(
        matches: &ArgMatches,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, std::io::Error> {
        let lookup = |arg: &str, key: &str| -> Option<String> {
            matches
                .get_one::<String>(arg)
                .cloned()
                .or_else(|| env(key).filter(|v| !v.trim().is_empty()))
        };

        let host = lookup("host", ENV_HOST).unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port_str = lookup("port", ENV_PORT).unwrap_or_else(|| DEFAULT_PORT.to_string());
        let port = port_str.trim().parse().map_err(|_| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("Invalid port number: {}", port_str),
            )
        })?;

        let uploads_dir = matches
            .get_one::<String>("uploads-dir")
            .cloned()
            .or_else(|| env(ENV_UPLOADS).filter(|v| !v.trim().is_empty()))
            .or_else(|| env(ENV_UPLOADS_DIR).filter(|v| !v.trim().is_empty()))
            .map(PathBuf::from)
            .or_else(|| {
                env(ENV_USER_DATA)
                    .filter(|v| !v.trim().is_empty())
                    .map(|dir| PathBuf::from(dir).join("uploads"))
            })
            .unwrap_or_else(|| PathBuf::from(DEFAULT_UPLOADS_DIR));

        let public_url = lookup("public-url", ENV_PUBLIC_URL)
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| match detect_lan_ipv4() {
                Some(ip) => format!("http://{}:{}", ip, port),
                None => format!("http://localhost:{}", port),
            });

        let sweep_interval = parse_secs(
            "sweep interval",
            lookup("sweep-interval-secs", ENV_SWEEP_INTERVAL_SECS),
            DEFAULT_SWEEP_INTERVAL_SECS,
        )?;
        let io_timeout = parse_secs(
            "I/O timeout",
            lookup("io-timeout-secs", ENV_IO_TIMEOUT_SECS),
            DEFAULT_IO_TIMEOUT_SECS,
        )?;

        Ok(ServerConfig {
            host,
            port,
            uploads_dir,
            public_url,
            sweep_interval,
            io_timeout,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn command() -> Command {
    Command::new("lanfile")
        .about("Share files with devices on the local network")
        .arg(
            Arg::new("port")
                .long("port")
                .value_name("PORT")
                .help("Server port (default: 3000, or PORT env var)"),
        )
        .arg(
            Arg::new("host")
                .long("host")
                .value_name("HOST")
                .help("Server host (default: 0.0.0.0, or SERVER_HOST env var)"),
        )
        .arg(
            Arg::new("uploads-dir")
                .long("uploads-dir")
                .value_name("DIR")
                .help("Drop directory (or LANFILE_UPLOADS / UPLOADS_DIR / LANFILE_USER_DATA env vars)"),
        )
        .arg(
            Arg::new("public-url")
                .long("public-url")
                .value_name("URL")
                .help("Address shown to other devices (default: detected LAN address)"),
        )
        .arg(
            Arg::new("sweep-interval-secs")
                .long("sweep-interval-secs")
                .value_name("SECS")
                .help("Seconds between cleanup sweeps (default: 60)"),
        )
        .arg(
            Arg::new("io-timeout-secs")
                .long("io-timeout-secs")
                .value_name("SECS")
                .help("Bound on directory and archive I/O in seconds (default: 30)"),
        )
}

fn parse_secs(
    what: &str,
    value: Option<String>,
    default: &str,
) -> Result<Duration, std::io::Error> {
    let raw = value.unwrap_or_else(|| default.to_string());
    raw.trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|_| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("Invalid {}: {}", what, raw),
            )
        })
}

/// First non-loopback IPv4 address the host would use for outbound traffic.
/// Connecting a UDP socket sends nothing; it only selects a route.
fn detect_lan_ipv4() -> Option<IpAddr> {
    let socket = UdpSocket::bind("0.0.0.0:0").ok()?;
    socket.connect("192.168.0.1:80").ok()?;
    let ip = socket.local_addr().ok()?.ip();
    (ip.is_ipv4() && !ip.is_loopback() && !ip.is_unspecified()).then_some(ip)
}
