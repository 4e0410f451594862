use dobble_engine::rules::{DEFAULT_STARTING_CARDS, GameRules};
use dobble_server::server::{DEFAULT_HOST, DEFAULT_PLAYERS, DEFAULT_PORT};
use serde::{Deserialize, Serialize};
use std::fs;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub players: usize,
    pub seed: Option<u64>,
    pub starting_cards: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueSource {
    Default,
    File,
    Env,
    Flag,
}

#[derive(Debug, Clone, Copy)]
pub struct ConfigSources {
    pub host: ValueSource,
    pub port: ValueSource,
    pub players: ValueSource,
    pub seed: ValueSource,
    pub starting_cards: ValueSource,
}

impl Default for ConfigSources {
    fn default() -> Self {
        Self {
            host: ValueSource::Default,
            port: ValueSource::Default,
            players: ValueSource::Default,
            seed: ValueSource::Default,
            starting_cards: ValueSource::Default,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfigResolved {
    pub config: Config,
    pub sources: ConfigSources,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.into(),
            port: DEFAULT_PORT,
            players: DEFAULT_PLAYERS,
            seed: None,
            starting_cards: DEFAULT_STARTING_CARDS,
        }
    }
}

impl Config {
    pub fn rules(&self) -> GameRules {
        GameRules {
            starting_cards: self.starting_cards,
            ..GameRules::default()
        }
    }
}

/// Values given on the command line; they win over every other source.
#[derive(Debug, Clone, Default)]
pub struct FlagOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub players: Option<usize>,
    pub seed: Option<u64>,
    pub starting_cards: Option<u32>,
}

impl ConfigResolved {
    pub fn apply_flags(mut self, flags: FlagOverrides) -> Result<Self, ConfigError> {
        if let Some(v) = flags.host {
            self.config.host = v;
            self.sources.host = ValueSource::Flag;
        }
        if let Some(v) = flags.port {
            self.config.port = v;
            self.sources.port = ValueSource::Flag;
        }
        if let Some(v) = flags.players {
            self.config.players = v;
            self.sources.players = ValueSource::Flag;
        }
        if let Some(v) = flags.seed {
            self.config.seed = Some(v);
            self.sources.seed = ValueSource::Flag;
        }
        if let Some(v) = flags.starting_cards {
            self.config.starting_cards = v;
            self.sources.starting_cards = ValueSource::Flag;
        }
        validate(&self.config)?;
        Ok(self)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Invalid(String),
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}
impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Parse(e)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "cannot read config file: {e}"),
            ConfigError::Parse(e) => write!(f, "cannot parse config file: {e}"),
            ConfigError::Invalid(msg) => write!(f, "{msg}"),
        }
    }
}

pub fn load_with_sources() -> Result<ConfigResolved, ConfigError> {
    let mut cfg = Config::default();
    let mut sources = ConfigSources::default();

    if let Ok(path) = std::env::var("DOBBLE_CONFIG")
        && !path.is_empty()
    {
        let s = fs::read_to_string(path)?;
        let f: FileConfig = toml::from_str(&s)?;
        if let Some(v) = f.host {
            cfg.host = v;
            sources.host = ValueSource::File;
        }
        if let Some(v) = f.port {
            cfg.port = v;
            sources.port = ValueSource::File;
        }
        if let Some(v) = f.players {
            cfg.players = v;
            sources.players = ValueSource::File;
        }
        if let Some(v) = f.seed {
            cfg.seed = Some(v);
            sources.seed = ValueSource::File;
        }
        if let Some(v) = f.starting_cards {
            cfg.starting_cards = v;
            sources.starting_cards = ValueSource::File;
        }
    }

    if let Ok(host) = std::env::var("DOBBLE_HOST")
        && !host.is_empty()
    {
        cfg.host = host;
        sources.host = ValueSource::Env;
    }
    if let Some(port) = env_value("DOBBLE_PORT", "port")? {
        cfg.port = port;
        sources.port = ValueSource::Env;
    }
    if let Some(players) = env_value("DOBBLE_PLAYERS", "players")? {
        cfg.players = players;
        sources.players = ValueSource::Env;
    }
    if let Some(seed) = env_value("DOBBLE_SEED", "seed")? {
        cfg.seed = Some(seed);
        sources.seed = ValueSource::Env;
    }
    if let Some(cards) = env_value("DOBBLE_STARTING_CARDS", "starting_cards")? {
        cfg.starting_cards = cards;
        sources.starting_cards = ValueSource::Env;
    }

    validate(&cfg)?;
    Ok(ConfigResolved {
        config: cfg,
        sources,
    })
}

fn env_value<T: std::str::FromStr>(var: &str, name: &str) -> Result<Option<T>, ConfigError> {
    match std::env::var(var) {
        Ok(raw) if !raw.is_empty() => raw
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid(format!("Invalid {name}: {raw}"))),
        _ => Ok(None),
    }
}

#[derive(Debug, Deserialize)]
struct FileConfig {
    #[serde(default)]
    host: Option<String>,
    #[serde(default)]
    port: Option<u16>,
    #[serde(default)]
    players: Option<usize>,
    #[serde(default)]
    seed: Option<u64>,
    #[serde(default)]
    starting_cards: Option<u32>,
}

fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if cfg.players == 0 {
        return Err(ConfigError::Invalid(
            "players must be >=1".into(),
        ));
    }
    if cfg.starting_cards == 0 {
        return Err(ConfigError::Invalid(
            "starting_cards must be >0".into(),
        ));
    }
    cfg.rules()
        .validate()
        .map_err(|e| ConfigError::Invalid(e.to_string()))
}
