use serde::Deserialize;

/// Top-level settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/playsim/config.toml` or `~/.config/playsim/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `PLAYSIM__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub sim: SimSettings,
    pub ui: UiSettings,
    pub controls: ControlsSettings,
    pub soak: SoakSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SimSettings {
    /// Logical milliseconds fed to the simulator per UI tick while the clock runs.
    pub tick_ms: u64,
    /// Wall-clock interval between UI ticks (milliseconds).
    pub poll_ms: u64,
    /// Logical milliseconds advanced by a single manual step.
    pub step_ms: u64,
    /// Whether the logical clock starts running.
    pub autostart: bool,
}

impl Default for SimSettings {
    fn default() -> Self {
        Self {
            tick_ms: 50,
            poll_ms: 50,
            step_ms: 250,
            autostart: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// The text rendered inside the top header box.
    pub header_text: String,

    /// How many events the log panel keeps.
    pub event_log_len: usize,

    /// Whether time updates are written to the event log (they are frequent).
    pub log_time_updates: bool,

    /// Which time fields to show for the status line, and in what order.
    ///
    /// Example: ["position", "window", "clock"]
    pub time_fields: Vec<TimeField>,

    /// Separator used to join `time_fields`.
    pub time_separator: String,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            header_text: " ~ deterministic playback ~ ".to_string(),
            event_log_len: 200,
            log_time_updates: false,
            time_fields: vec![TimeField::Position, TimeField::Window, TimeField::Clock],
            time_separator: " / ".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ControlsSettings {
    /// Milliseconds to seek when pressing `h` / `l`.
    pub seek_step_ms: u64,
}

impl Default for ControlsSettings {
    fn default() -> Self {
        Self { seek_step_ms: 1000 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SoakSettings {
    /// Seed used when none is given on the command line.
    pub seed: u64,
    /// Number of random operations per soak run.
    pub operations: u64,
}

impl Default for SoakSettings {
    fn default() -> Self {
        Self {
            seed: 0,
            operations: 10_000,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TimeField {
    /// Play head position.
    #[serde(alias = "pos")]
    Position,
    /// Start and end of the playable window.
    #[serde(alias = "range")]
    Window,
    /// Time left until the end of the current pass.
    Remaining,
    /// Total logical time consumed.
    #[serde(alias = "elapsed")]
    Clock,
}
