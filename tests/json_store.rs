mod common;

use common::{SITE, TestInstall, handler_names, test_env};
use php_manager::host::LocalFileSystem;
use php_manager::server::JsonFileStore;
use php_manager::{ConfigurationStore, FastCgiRegistrar, Scope};
use tempfile::tempdir;

#[test]
fn test_registration_survives_reopen() {
    let install = TestInstall::standard("8.2.1");
    let env = test_env();
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("applicationHost.json");

    let mut store = JsonFileStore::open(&path).unwrap();
    store.add_site(SITE);
    FastCgiRegistrar::new(&mut store, &LocalFileSystem, &env)
        .register(install.path(), &Scope::site(SITE))
        .unwrap();

    let reopened = JsonFileStore::open(&path).unwrap();
    let site = handler_names(&reopened.handler_mappings(&Scope::site(SITE)).unwrap());
    assert_eq!(site, vec!["php-8.2.1"]);
    assert!(reopened.handler_mappings(&Scope::Server).unwrap().is_empty());

    let apps = reopened.fastcgi_applications();
    assert_eq!(apps.len(), 1);
    assert_eq!(apps[0].env_var("PHPRC"), Some(&*install.path().to_string_lossy()));

    let json = std::fs::read_to_string(&path).unwrap();
    assert!(json.contains("\"stderr_mode\""));
}

#[test]
fn test_rollback_discards_uncommitted_changes() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("applicationHost.json");
    let mut store = JsonFileStore::open(&path).unwrap();
    store.add_site(SITE);
    store.commit().unwrap();

    store
        .fastcgi_applications_mut()
        .push(php_manager::server::FastCgiApplication::new("C:\\PHP\\php-cgi.exe", ""));
    store.rollback();
    assert!(store.fastcgi_applications().is_empty());
    assert_eq!(store.path(), path.as_path());

    let reopened = JsonFileStore::open(&path).unwrap();
    assert!(reopened.fastcgi_applications().is_empty());
    assert!(reopened.handler_mappings(&Scope::site(SITE)).unwrap().is_empty());
}
