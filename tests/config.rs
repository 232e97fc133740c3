use entity_gateway::config::{DATABASE_URL, MAX_CONNECTIONS, TABLE_PREFIX};
use entity_gateway::{ConfigError, Settings};
use serial_test::serial;

fn clear_env() {
    for key in [DATABASE_URL, MAX_CONNECTIONS, TABLE_PREFIX] {
        std::env::remove_var(key);
    }
}

#[test]
#[serial]
fn reads_the_process_environment() {
    clear_env();
    std::env::set_var(DATABASE_URL, "mysql://root@localhost/app");
    std::env::set_var(MAX_CONNECTIONS, "3");
    std::env::set_var(TABLE_PREFIX, "t_");
    let s = Settings::from_env().unwrap();
    assert_eq!(s.database_url, "mysql://root@localhost/app");
    assert_eq!(s.max_connections, 3);
    assert_eq!(s.table_name("users"), "t_users");
    clear_env();
}

#[test]
#[serial]
fn database_url_is_required() {
    clear_env();
    assert!(matches!(Settings::from_env(), Err(ConfigError::Missing(_))));
}

#[test]
#[serial]
fn empty_prefix_means_none() {
    clear_env();
    std::env::set_var(DATABASE_URL, "mysql://localhost/app");
    std::env::set_var(TABLE_PREFIX, "  ");
    assert_eq!(Settings::from_env().unwrap().table_prefix, None);
    clear_env();
}
