use std::io::Write;

use kit_session::session::{ConfigurationError, ExpiresIn, RollingPolicy};
use kit_session::settings::{RollingSetting, SecretSetting, SessionSettings};
use kit_session::{normalize, SessionManager};
use serial_test::serial;

const ENV_VARS: &[&str] = &[
    "SESSION_SECRET",
    "SESSION_KEY",
    "SESSION_EXPIRES",
    "SESSION_ROLLING",
    "COOKIE_SECURE",
    "KIT_SESSION_CONFIG_DIR",
    "KIT_SESSION_ENV",
];

fn clear_env() {
    for var in ENV_VARS {
        std::env::remove_var(var);
    }
}

#[test]
fn test_settings_file_normalizes() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(
        file,
        r#"
key = "app.sid"
expires = 30
expires_in = "minutes"
rolling = 20.0

[[secret]]
id = 4
secret = "current"

[[secret]]
id = 3
secret = "previous"

[cookie]
path = "/app"
http_only = false
"#
    )
    .expect("write settings");

    let settings = SessionSettings::from_file(file.path()).expect("settings parse");
    let config = normalize(&settings, false).expect("settings normalize");

    assert_eq!(config.key(), "app.sid");
    assert_eq!(config.expires_in(), ExpiresIn::Minutes);
    assert_eq!(config.max_age_seconds(), 1800);
    assert_eq!(config.rolling(), RollingPolicy::Threshold(20.0));
    assert_eq!(config.secrets().current().id(), 4);
    assert_eq!(config.cookie().path, "/app");
    assert!(!config.cookie().http_only);
}

#[test]
fn test_invalid_settings_file_reports_path() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "expires = \"soon\"").expect("write settings");

    let err = SessionSettings::from_file(file.path()).expect_err("invalid settings");
    assert!(format!("{err:#}").contains("Failed to parse"));
}

#[test]
#[serial]
fn test_env_overrides() {
    clear_env();
    std::env::set_var("SESSION_SECRET", "from-env");
    std::env::set_var("SESSION_KEY", "env.session");
    std::env::set_var("SESSION_EXPIRES", "3");
    std::env::set_var("SESSION_ROLLING", "true");
    std::env::set_var("COOKIE_SECURE", "false");

    let mut settings = SessionSettings::default();
    settings.apply_env_overrides();

    assert!(matches!(settings.secret, Some(SecretSetting::Single(ref s)) if s == "from-env"));
    assert_eq!(settings.key.as_deref(), Some("env.session"));
    assert_eq!(settings.expires, Some(3));
    assert_eq!(settings.rolling, Some(RollingSetting::Enabled(true)));
    assert_eq!(settings.cookie.secure, Some(false));

    clear_env();
}

#[test]
#[serial]
fn test_load_from_config_dir() {
    clear_env();
    let dir = tempfile::tempdir().expect("temp dir");
    std::fs::write(
        dir.path().join("Session.toml"),
        "secret = \"dir-secret\"\nexpires = 2\n",
    )
    .expect("write settings");
    std::env::set_var("KIT_SESSION_CONFIG_DIR", dir.path());

    let settings = SessionSettings::load().expect("settings load");
    assert!(matches!(settings.secret, Some(SecretSetting::Single(ref s)) if s == "dir-secret"));
    assert_eq!(settings.expires, Some(2));

    clear_env();
}

#[test]
#[serial]
fn test_production_flag_drives_secure_default() {
    clear_env();
    std::env::set_var("KIT_SESSION_ENV", "production");
    assert!(kit_session::settings::is_production());

    let settings = SessionSettings::new("secret");
    let config = kit_session::SessionConfig::try_from(&settings).expect("valid settings");
    assert!(config.cookie().secure);

    clear_env();
    assert!(!kit_session::settings::is_production());
}

#[test]
fn test_missing_secret_aborts_setup() {
    let result = SessionManager::from_settings(&SessionSettings::default().expires(7), true);
    assert!(matches!(result, Err(ConfigurationError::MissingSecret)));
}

#[test]
#[serial]
fn test_oversized_env_lifetime_aborts_setup() {
    clear_env();
    std::env::set_var("SESSION_EXPIRES", "1000000000000000");

    let mut settings = SessionSettings::new("secret");
    settings.apply_env_overrides();

    let result = SessionManager::from_settings(&settings, false);
    assert!(matches!(
        result,
        Err(ConfigurationError::LifetimeOutOfRange(_))
    ));

    clear_env();
}
