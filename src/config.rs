use serde::Deserialize;

use std::{
    env, fmt, fs,
    path::{Path, PathBuf},
};

pub const DEFAULT_AUTHORITY_HOST: &str = "https://login.microsoftonline.com";
pub const DEFAULT_GRAPH_BASE_URL: &str = "https://graph.microsoft.com";

#[derive(Clone, Deserialize)]
pub struct Config {
    pub client_id: String,
    pub client_secret: String,
    pub tenant_id: String,
    /// Mailbox the messages are sent from, also used in the sendMail path.
    pub mail_username: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_template_dir")]
    pub template_dir: String,
    #[serde(default = "default_authority_host")]
    pub authority_host: String,
    #[serde(default = "default_graph_base_url")]
    pub graph_base_url: String,
}

const fn default_port() -> u16 {
    3000
}

fn default_template_dir() -> String {
    "templates".to_string()
}

fn default_authority_host() -> String {
    DEFAULT_AUTHORITY_HOST.to_string()
}

fn default_graph_base_url() -> String {
    DEFAULT_GRAPH_BASE_URL.to_string()
}

impl Config {
    /// Token authority for the configured tenant, e.g.
    /// `https://login.microsoftonline.com/<tenant>`.
    pub fn authority(&self) -> String {
        format!(
            "{}/{}",
            self.authority_host.trim_end_matches('/'),
            self.tenant_id
        )
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("tenant_id", &self.tenant_id)
            .field("mail_username", &self.mail_username)
            .field("port", &self.port)
            .field("template_dir", &self.template_dir)
            .field("authority_host", &self.authority_host)
            .field("graph_base_url", &self.graph_base_url)
            .finish()
    }
}

const EXAMPLE_CONFIG_FILE: &str = "config.example.yaml";

fn read_config_file(path: &Path) -> Result<Config, Box<dyn std::error::Error>> {
    let contents = fs::read_to_string(path)?;
    serde_yaml::from_str(&contents).map_err(Into::into)
}

fn load_from_env() -> Result<Config, Box<dyn std::error::Error>> {
    let client_id =
        env::var("CLIENT_ID").map_err(|_| "CLIENT_ID environment variable is required")?;
    let client_secret =
        env::var("CLIENT_SECRET").map_err(|_| "CLIENT_SECRET environment variable is required")?;
    let tenant_id =
        env::var("TENANT_ID").map_err(|_| "TENANT_ID environment variable is required")?;
    let mail_username =
        env::var("MAIL_USERNAME").map_err(|_| "MAIL_USERNAME environment variable is required")?;

    let port = match env::var("PORT") {
        Ok(port) => port
            .parse::<u16>()
            .map_err(|e| format!("Failed to parse PORT: {e}"))?,
        Err(_) => default_port(),
    };

    Ok(Config {
        client_id,
        client_secret,
        tenant_id,
        mail_username,
        port,
        template_dir: env::var("TEMPLATE_DIR").unwrap_or_else(|_| default_template_dir()),
        authority_host: env::var("AUTHORITY_HOST").unwrap_or_else(|_| default_authority_host()),
        graph_base_url: env::var("GRAPH_BASE_URL").unwrap_or_else(|_| default_graph_base_url()),
    })
}

/// Returns the first existing file among `requested` and `fallbacks`.
fn locate_config_file(requested: &Path, fallbacks: &[&Path]) -> Option<PathBuf> {
    std::iter::once(requested)
        .chain(fallbacks.iter().copied())
        .find(|path| path.exists())
        .map(Path::to_path_buf)
}

pub fn load_config() -> Result<Config, Box<dyn std::error::Error>> {
    let config_path =
        env::var("GRAPH_MAILER_CONFIG").unwrap_or_else(|_| "config.yaml".to_string());

    let example = Path::new(EXAMPLE_CONFIG_FILE);
    if let Some(found) =
        locate_config_file(Path::new(&config_path), &[Path::new("config.yaml"), example])
    {
        if found != Path::new(&config_path) {
            tracing::warn!(
                "Config file '{}' not found, using '{}'",
                config_path,
                found.display()
            );
        }
        if found == example {
            tracing::warn!(
                "'{EXAMPLE_CONFIG_FILE}' holds placeholder credentials and should be replaced"
            );
        }
        return read_config_file(&found);
    }

    tracing::info!(
        "No config file found, attempting to load configuration from environment variables"
    );
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Successfully loaded configuration from environment variables");
            Ok(config)
        }
        Err(e) => Err(format!(
            "Config file not found and environment variables are incomplete. \
             Tried: '{config_path}', 'config.yaml', 'config.example.yaml', and environment variables. \
             Error: {e}"
        )
        .into()),
    }
}
