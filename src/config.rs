use std::{env, net::SocketAddr, path::PathBuf, time::Duration};

/// Length of one cycle in whole days.
pub const TOTAL_DAYS: i64 = 10;

pub const TICK_INTERVAL: Duration = Duration::from_secs(60);
pub const SPAWN_INTERVAL: Duration = Duration::from_secs(3);
pub const PARTICLE_LIFETIME: Duration = Duration::from_secs(5);
pub const KEEPALIVE_INTERVAL: Duration = Duration::from_secs(30);

pub const CELEBRATION_MESSAGE: &str = "🌱💧🌿";
pub const CELEBRATION_VISIBLE_FOR: Duration = Duration::from_secs(2);
pub const CELEBRATION_BURST: u32 = 10;
pub const CELEBRATION_STAGGER: Duration = Duration::from_millis(100);

/// A helper process command line, split on whitespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelperCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl HelperCommand {
    pub fn parse(value: &str) -> Option<Self> {
        let mut words = value.split_whitespace().map(str::to_string);
        let program = words.next()?;
        Some(Self {
            program,
            args: words.collect(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub data_path: PathBuf,
    pub keep_awake: bool,
    /// Overrides the `systemd-inhibit` idle inhibitor.
    pub lock_command: Option<HelperCommand>,
    /// Overrides the `aplay` silence player.
    pub audio_command: Option<HelperCommand>,
}

impl Config {
    pub fn from_env() -> Self {
        let port = env::var("PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(8080);

        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], port)),
            data_path: resolve_data_path(),
            keep_awake: keep_awake_enabled(env::var("KEEP_AWAKE").ok().as_deref()),
            lock_command: helper_command("KEEP_AWAKE_LOCK_CMD"),
            audio_command: helper_command("KEEP_AWAKE_AUDIO_CMD"),
        }
    }
}

pub fn resolve_data_path() -> PathBuf {
    if let Ok(path) = env::var("APP_DATA_PATH") {
        return PathBuf::from(path);
    }

    PathBuf::from("data/state.json")
}

fn helper_command(var: &str) -> Option<HelperCommand> {
    env::var(var).ok().as_deref().and_then(HelperCommand::parse)
}

fn keep_awake_enabled(value: Option<&str>) -> bool {
    !matches!(
        value.map(|v| v.trim().to_ascii_lowercase()).as_deref(),
        Some("off" | "0" | "false" | "no")
    )
}
