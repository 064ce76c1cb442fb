use serde::Deserialize;

/// Config, from a TOML file whose path is the first CLI arg.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// By default, output JSON logs. Only if this flag is set to true, output colourful human-friendly logs
    #[serde(default)]
    pub human_logs: bool,

    /// After seeding, print every metric in the Prometheus text format to stdout
    #[serde(default)]
    pub print_metrics: bool,

    /// password to connect to database.
    pub db_dsn: String,

    /// maximum number of connections maintained by PostgresStore
    pub db_pool_size: u32,

    /// maximum seconds waiting for a database connection
    pub db_connection_timeout: u64,

    #[serde(default)]
    pub seed: SeedConfig,
}

/// How big a sample community to create.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedConfig {
    /// Users besides the example admin user.
    #[serde(default = "sample_users")]
    pub sample_users: usize,

    /// Microposts written by each of the first few users.
    #[serde(default = "posts_per_user")]
    pub posts_per_user: usize,

    /// Every seeded user gets this password.
    #[serde(default = "sample_password")]
    pub password: String,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            sample_users: sample_users(),
            posts_per_user: posts_per_user(),
            password: sample_password(),
        }
    }
}

impl Config {
    pub fn from_file(filepath: &str) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(filepath)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(contents)?)
    }
}

fn sample_users() -> usize {
    99
}

fn posts_per_user() -> usize {
    50
}

fn sample_password() -> String {
    "password".to_owned()
}
