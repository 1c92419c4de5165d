//! Handler mapping registry for one scope.
//!
//! Index 0 is authoritative: activating a mapping means moving it to the
//! front. Below the top level, every positional change is preceded by
//! `localize`, so an inherited list is never reordered in place.

use super::handler::HandlerMapping;
use super::scope::{self, ResolvedScope, Scope};
use super::ConfigurationStore;
use crate::error::{ManagerError, Result};
use crate::ini::Key;
use tracing::{debug, info};

pub struct HandlerRegistry<'s> {
    scope: ResolvedScope<'s>,
}

impl<'s> HandlerRegistry<'s> {
    pub fn new(scope: ResolvedScope<'s>) -> Self {
        Self { scope }
    }

    pub fn open(store: &'s mut dyn ConfigurationStore, scope: &Scope) -> Self {
        Self::new(scope::resolve(store, scope))
    }

    pub fn scope(&self) -> &ResolvedScope<'s> {
        &self.scope
    }

    pub fn mappings(&self) -> Result<Vec<HandlerMapping>> {
        self.scope.handler_mappings()
    }

    pub fn find_by_name(&self, name: &str) -> Result<Option<HandlerMapping>> {
        Ok(self.mappings()?.into_iter().find(|m| m.has_name(name)))
    }

    /// The active mapping for `path`: the first one in precedence order.
    pub fn find_by_path(&self, path: &str) -> Result<Option<HandlerMapping>> {
        Ok(self.mappings()?.into_iter().find(|m| m.matches_path(path)))
    }

    /// Every mapping for `path`, active one first.
    pub fn find_all_by_path(&self, path: &str) -> Result<Vec<HandlerMapping>> {
        Ok(self
            .mappings()?
            .into_iter()
            .filter(|m| m.matches_path(path))
            .collect())
    }

    pub fn find_by_path_and_processor(
        &self,
        path: &str,
        script_processor: &str,
    ) -> Result<Option<HandlerMapping>> {
        Ok(self
            .mappings()?
            .into_iter()
            .find(|m| m.matches_path(path) && m.matches_processor(script_processor)))
    }

    /// Replace the scope's local list with copies of everything visible there.
    pub fn localize(&mut self) -> Result<()> {
        let snapshot = self.mappings()?;
        let count = snapshot.len();
        let local = self.scope.local_handlers_mut()?;
        local.clear();
        local.entries.extend(snapshot);
        debug!(scope = %self.scope.scope(), count, "localized handler mappings");
        Ok(())
    }

    /// Make `name` the first mapping at this scope.
    pub fn activate(&mut self, name: &str) -> Result<HandlerMapping> {
        if self.find_by_name(name)?.is_none() {
            return Err(ManagerError::NotFound(format!(
                "handler mapping '{}' at {}",
                name,
                self.scope.scope()
            )));
        }
        if !self.scope.is_top_level() {
            self.localize()?;
        }

        let local = self.scope.local_handlers_mut()?;
        let index = local
            .position(name)
            .ok_or_else(|| ManagerError::NotFound(format!("handler mapping '{}'", name)))?;
        local.move_to_front(index);
        let active = local.entries[0].clone();
        info!(handler = %active.name, scope = %self.scope.scope(), "activated handler mapping");
        Ok(active)
    }

    /// Insert `mapping` ahead of every other mapping at this scope.
    pub fn insert_first(&mut self, mapping: HandlerMapping) -> Result<()> {
        self.scope.local_handlers_mut()?.entries.insert(0, mapping);
        Ok(())
    }

    /// `<prefix><version>`, suffixed `_1`, `_2`, ... until no visible mapping has it.
    pub fn unique_name(&self, prefix: &str, version: &str) -> Result<String> {
        let taken: Vec<Key> = self
            .mappings()?
            .iter()
            .map(|m| Key::new(&m.name))
            .collect();
        let base = format!("{}{}", prefix, version);
        let mut candidate = base.clone();
        let mut suffix = 1;
        while taken.contains(&Key::new(&candidate)) {
            candidate = format!("{}_{}", base, suffix);
            suffix += 1;
        }
        Ok(candidate)
    }

    /// Return the equivalent existing mapping, or register `template` under a
    /// fresh name derived from `version` as the first mapping.
    pub fn ensure(
        &mut self,
        mut template: HandlerMapping,
        prefix: &str,
        version: &str,
    ) -> Result<HandlerMapping> {
        if let Some(existing) =
            self.find_by_path_and_processor(&template.path, &template.script_processor)?
        {
            return Ok(existing);
        }
        template.name = self.unique_name(prefix, version)?;
        self.insert_first(template.clone())?;
        info!(handler = %template.name, scope = %self.scope.scope(), "registered handler mapping");
        Ok(template)
    }
}
