use pretty_assertions::assert_eq;
use serial_test::serial;
use std::env;

use hrms_be::Config;

const VARS: &[&str] = &[
    "DATABASE_URL",
    "JWT_SECRET",
    "JWT_EXPIRATION_DAYS",
    "HOST",
    "PORT",
    "ENVIRONMENT",
    "LEDGER_WRITE_RETRIES",
];

fn clear_env() {
    for var in VARS {
        unsafe { env::remove_var(var) };
    }
}

#[test]
#[serial]
fn defaults_apply_without_environment() {
    clear_env();

    let config = Config::from_env_only().unwrap();
    assert_eq!(config.database_url, "postgres://@localhost:5432/hrms");
    assert_eq!(config.host, "127.0.0.1");
    assert_eq!(config.port, 8080);
    assert_eq!(config.jwt_expiration_days, 30);
    assert_eq!(config.environment, "development");
    assert_eq!(config.ledger_write_retries, 3);
    assert!(config.is_development());
    assert!(!config.is_production());
}

#[test]
#[serial]
fn environment_variables_override_defaults() {
    clear_env();
    unsafe {
        env::set_var("DATABASE_URL", "postgres://hr@db:5432/hr_test");
        env::set_var("HOST", "0.0.0.0");
        env::set_var("PORT", "9090");
        env::set_var("ENVIRONMENT", "production");
        env::set_var("LEDGER_WRITE_RETRIES", "5");
    }

    let config = Config::from_env_only().unwrap();
    assert_eq!(config.database_url, "postgres://hr@db:5432/hr_test");
    assert_eq!(config.server_address(), "0.0.0.0:9090");
    assert_eq!(config.ledger_write_retries, 5);
    assert!(config.is_production());

    clear_env();
}

#[test]
#[serial]
fn unparseable_numbers_fall_back_to_defaults() {
    clear_env();
    unsafe {
        env::set_var("PORT", "not-a-port");
        env::set_var("LEDGER_WRITE_RETRIES", "many");
    }

    let config = Config::from_env_only().unwrap();
    assert_eq!(config.port, 8080);
    assert_eq!(config.ledger_write_retries, 3);

    clear_env();
}
