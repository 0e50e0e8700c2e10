//! Shared utilities for the courier command line tools.

use clap::Args;
use courier_client::{ConnectOptions, QoS};

/// Common connection arguments shared between the pub and sub tools.
#[derive(Args, Debug, Clone)]
pub struct ConnectionArgs {
    /// MQTT broker hostname
    #[arg(short = 'H', long, default_value = "localhost")]
    pub host: String,

    /// MQTT broker port
    #[arg(short = 'p', long, default_value = "1883")]
    pub port: u16,

    /// Client ID (a default is used if not specified)
    #[arg(short = 'i', long)]
    pub client_id: Option<String>,

    /// User name for authentication
    #[arg(short = 'u', long)]
    pub user_name: Option<String>,

    /// Password for authentication
    #[arg(short = 'P', long)]
    pub password: Option<String>,

    /// Enable verbose output
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

impl ConnectionArgs {
    /// Broker address in `host:port` form.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Convert CLI arguments to ConnectOptions.
    pub fn to_connect_options(&self) -> ConnectOptions {
        let mut opts = ConnectOptions::new();

        if let Some(ref id) = self.client_id {
            opts = opts.client_id(id.clone());
        }

        if let Some(ref user) = self.user_name {
            opts = opts.user_name(user.clone());
        }

        if let Some(ref pass) = self.password {
            opts = opts.password(pass.as_bytes().to_vec());
        }

        opts
    }
}

/// Parse a QoS command line value.
pub fn parse_qos(qos: u8) -> Option<QoS> {
    match qos {
        0 => Some(QoS::AtMostOnce),
        1 => Some(QoS::AtLeastOnce),
        2 => Some(QoS::ExactlyOnce),
        _ => None,
    }
}

/// Initialize tracing/logging based on verbosity.
pub fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };

    fmt().with_env_filter(filter).init();
}
