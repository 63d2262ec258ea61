use super::load::{default_config_path, resolve_config_path};
use super::schema::*;
use std::sync::{Mutex, OnceLock};

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

struct EnvGuard {
    key: &'static str,
    old: Option<std::ffi::OsString>,
}

impl EnvGuard {
    fn set(key: &'static str, val: &str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::set_var(key, val);
        }
        Self { key, old }
    }

    fn remove(key: &'static str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::remove_var(key);
        }
        Self { key, old }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match self.old.take() {
            Some(v) => unsafe {
                std::env::set_var(self.key, v);
            },
            None => unsafe {
                std::env::remove_var(self.key);
            },
        }
    }
}

#[test]
fn resolve_config_path_prefers_playsim_config_path() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("PLAYSIM_CONFIG_PATH", "/tmp/playsim-test-config.toml");
    assert_eq!(
        resolve_config_path().unwrap(),
        std::path::PathBuf::from("/tmp/playsim-test-config.toml")
    );
}

#[test]
fn default_config_path_prefers_xdg_config_home() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("XDG_CONFIG_HOME", "/tmp/xdg-config-home");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-should-not-win");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/xdg-config-home")
            .join("playsim")
            .join("config.toml")
    );
}

#[test]
fn default_config_path_falls_back_to_home_dot_config() {
    let _lock = env_lock();
    let _g1 = EnvGuard::remove("XDG_CONFIG_HOME");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-dir");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/home-dir")
            .join(".config")
            .join("playsim")
            .join("config.toml")
    );
}

#[test]
fn settings_load_from_config_file_and_parse_time_field_aliases() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[sim]
tick_ms = 10
poll_ms = 20
step_ms = 100
autostart = true

[controls]
seek_step_ms = 2500

[ui]
header_text = "hello"
event_log_len = 16
log_time_updates = true
time_fields = ["pos", "remaining", "elapsed"]
time_separator = " | "

[soak]
seed = 7
operations = 99
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("PLAYSIM_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::remove("PLAYSIM__SIM__TICK_MS");

    let s = Settings::load().unwrap();
    assert_eq!(s.sim.tick_ms, 10);
    assert_eq!(s.sim.poll_ms, 20);
    assert_eq!(s.sim.step_ms, 100);
    assert!(s.sim.autostart);
    assert_eq!(s.controls.seek_step_ms, 2500);
    assert_eq!(s.ui.header_text, "hello");
    assert_eq!(s.ui.event_log_len, 16);
    assert!(s.ui.log_time_updates);
    assert_eq!(
        s.ui.time_fields,
        vec![TimeField::Position, TimeField::Remaining, TimeField::Clock]
    );
    assert_eq!(s.ui.time_separator, " | ");
    assert_eq!(s.soak.seed, 7);
    assert_eq!(s.soak.operations, 99);
    assert!(s.validate().is_ok());
}

#[test]
fn settings_env_overrides_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[sim]
tick_ms = 250
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("PLAYSIM_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::set("PLAYSIM__SIM__TICK_MS", "5");

    let s = Settings::load().unwrap();
    assert_eq!(s.sim.tick_ms, 5);
}

#[test]
fn missing_config_file_falls_back_to_defaults() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let _g1 = EnvGuard::set(
        "PLAYSIM_CONFIG_PATH",
        dir.path().join("nope.toml").to_str().unwrap(),
    );
    let _g2 = EnvGuard::remove("PLAYSIM__SIM__TICK_MS");

    let s = Settings::load().unwrap();
    assert_eq!(s.sim.tick_ms, 50);
    assert_eq!(s.controls.seek_step_ms, 1000);
    assert_eq!(s.ui.event_log_len, 200);
}

#[test]
fn validate_rejects_zero_sizes() {
    let mut s = Settings::default();
    assert!(s.validate().is_ok());

    s.sim.tick_ms = 0;
    assert!(s.validate().unwrap_err().contains("tick_ms"));

    let mut s = Settings::default();
    s.ui.event_log_len = 0;
    assert!(s.validate().unwrap_err().contains("event_log_len"));
}
