//! Configuration scopes and their resolution against a store.

use super::fastcgi::FastCgiApplication;
use super::handler::HandlerMapping;
use super::{ConfigurationStore, HandlerList, SchemaField};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where settings are read or written.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scope {
    Server,
    Site { name: String, path: Option<String> },
}

impl Scope {
    pub fn site(name: &str) -> Self {
        Scope::Site {
            name: name.to_string(),
            path: None,
        }
    }

    pub fn site_path(name: &str, path: &str) -> Self {
        let path = path.trim_matches('/');
        Scope::Site {
            name: name.to_string(),
            path: (!path.is_empty()).then(|| path.to_string()),
        }
    }

    pub fn is_server(&self) -> bool {
        matches!(self, Scope::Server)
    }

    pub fn site_name(&self) -> Option<&str> {
        match self {
            Scope::Server => None,
            Scope::Site { name, .. } => Some(name),
        }
    }

    /// Next scope up: a path's site, a site's server. `None` for the server.
    pub fn parent(&self) -> Option<Scope> {
        match self {
            Scope::Server => None,
            Scope::Site { path: None, .. } => Some(Scope::Server),
            Scope::Site {
                name,
                path: Some(path),
            } => match path.rsplit_once('/') {
                Some((parent, _)) => Some(Scope::site_path(name, parent)),
                None => Some(Scope::site(name)),
            },
        }
    }

    /// Canonical lower-case identifier, `""` for the server.
    pub fn key(&self) -> String {
        match self {
            Scope::Server => String::new(),
            Scope::Site { name, path: None } => name.to_lowercase(),
            Scope::Site {
                name,
                path: Some(path),
            } => format!("{}/{}", name, path).to_lowercase(),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Server => f.write_str("server"),
            Scope::Site { name, path: None } => write!(f, "site '{}'", name),
            Scope::Site {
                name,
                path: Some(path),
            } => write!(f, "site '{}/{}'", name, path),
        }
    }
}

/// A store bound to one scope.
///
/// FastCGI applications are always server-global; handler mappings are read
/// with inheritance and written to the scope's local list.
pub struct ResolvedScope<'s> {
    store: &'s mut dyn ConfigurationStore,
    scope: Scope,
    is_top_level: bool,
}

pub fn resolve<'s>(store: &'s mut dyn ConfigurationStore, scope: &Scope) -> ResolvedScope<'s> {
    let is_top_level = store.is_top_level_scope(scope);
    ResolvedScope {
        store,
        scope: scope.clone(),
        is_top_level,
    }
}

impl<'s> ResolvedScope<'s> {
    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn is_top_level(&self) -> bool {
        self.is_top_level
    }

    pub fn handler_mappings(&self) -> Result<Vec<HandlerMapping>> {
        self.store.handler_mappings(&self.scope)
    }

    pub fn local_handlers_mut(&mut self) -> Result<&mut HandlerList> {
        self.store.local_handlers_mut(&self.scope)
    }

    pub fn fastcgi_applications(&self) -> &[FastCgiApplication] {
        self.store.fastcgi_applications()
    }

    pub fn fastcgi_applications_mut(&mut self) -> &mut Vec<FastCgiApplication> {
        self.store.fastcgi_applications_mut()
    }

    pub fn has_field(&self, field: SchemaField) -> bool {
        self.store.has_field(field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_parents() {
        let deep = Scope::site_path("Default Web Site", "/app/admin/");
        assert_eq!(deep.key(), "default web site/app/admin");
        assert_eq!(deep.parent(), Some(Scope::site_path("Default Web Site", "app")));
        assert_eq!(
            Scope::site_path("Default Web Site", "app").parent(),
            Some(Scope::site("Default Web Site"))
        );
        assert_eq!(Scope::site("x").parent(), Some(Scope::Server));
        assert_eq!(Scope::Server.parent(), None);
        assert_eq!(Scope::site_path("x", "/"), Scope::site("x"));
    }
}
