mod common;

use common::{SITE, handler_names, static_file_handler, store_with_site};
use php_manager::server::HandlerMapping;
use php_manager::{ErrorKind, HandlerRegistry, Scope};

fn php(name: &str) -> HandlerMapping {
    HandlerMapping::fastcgi(name, "*.php", &format!("C:\\{}\\php-cgi.exe", name), "FastCgiModule")
}

#[test]
fn test_path_scope_activation_localizes_only_that_path() {
    let mut store = store_with_site(vec![php("php-7.4"), php("php-8.2"), static_file_handler()]);
    let app = Scope::site_path(SITE, "/app");
    let site = Scope::site(SITE);

    HandlerRegistry::open(&mut store, &app).activate("php-8.2").unwrap();

    let app_view = HandlerRegistry::open(&mut store, &app).mappings().unwrap();
    assert_eq!(handler_names(&app_view), vec!["php-8.2", "php-7.4", "StaticFile"]);
    let site_view = HandlerRegistry::open(&mut store, &site).mappings().unwrap();
    assert_eq!(handler_names(&site_view), vec!["php-7.4", "php-8.2", "StaticFile"]);
    assert!(!store.pending().scoped_handlers.contains_key(&site.key()));
}

#[test]
fn test_site_additions_shadow_server_entries() {
    let mut store = store_with_site(vec![php("php-7.4")]);
    let site = Scope::site(SITE);

    let mut registry = HandlerRegistry::open(&mut store, &site);
    registry.insert_first(php("php-8.2")).unwrap();
    assert_eq!(registry.find_by_path("*.php").unwrap().unwrap().name, "php-8.2");
    assert!(!registry.scope().is_top_level());

    let server = HandlerRegistry::open(&mut store, &Scope::Server);
    assert_eq!(server.find_by_path("*.php").unwrap().unwrap().name, "php-7.4");
    assert!(server.scope().is_top_level());
}

#[test]
fn test_unknown_site_is_not_found() {
    let mut store = store_with_site(vec![php("php-7.4")]);
    let mut registry = HandlerRegistry::open(&mut store, &Scope::site("Missing"));
    assert_eq!(registry.mappings().unwrap_err().kind(), ErrorKind::NotFound);
    assert_eq!(registry.activate("php-7.4").unwrap_err().kind(), ErrorKind::NotFound);
}
