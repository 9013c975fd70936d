//! Style factories: the point where a resolved style name must actually
//! exist.
//!
//! The registry and resolver accept any name. A subsystem that instantiates
//! styles keeps a [`StyleFactory`] with one constructor per style it can
//! build; asking for anything else fails here.

use std::collections::BTreeMap;
use std::fmt;

use crate::{ModuleSet, StyleCategory, StyleError, StyleOwner, StyleRegistry};

/// Builds one style instance from its concrete name.
pub type StyleConstructor<T> = Box<dyn Fn(&str) -> T + Send + Sync>;

pub struct StyleFactory<T> {
    category: StyleCategory,
    constructors: BTreeMap<String, StyleConstructor<T>>,
}

impl<T> StyleFactory<T> {
    pub fn new(category: StyleCategory) -> Self {
        Self {
            category,
            constructors: BTreeMap::new(),
        }
    }

    pub fn category(&self) -> StyleCategory {
        self.category
    }

    pub fn register<F>(&mut self, name: impl Into<String>, constructor: F) -> &mut Self
    where
        F: Fn(&str) -> T + Send + Sync + 'static,
    {
        self.constructors.insert(name.into(), Box::new(constructor));
        self
    }

    /// Register `name` only when its owning module is installed (built-in
    /// styles always register).
    pub fn register_installed<F>(
        &mut self,
        registry: &StyleRegistry,
        modules: &ModuleSet,
        name: &str,
        constructor: F,
    ) -> &mut Self
    where
        F: Fn(&str) -> T + Send + Sync + 'static,
    {
        let installed = match registry.lookup(self.category, name) {
            StyleOwner::BuiltIn => true,
            StyleOwner::Module(module) => modules.is_installed(module),
        };
        if installed {
            self.register(name, constructor);
        }
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.constructors.keys().map(String::as_str)
    }

    /// Instantiate `name`.
    ///
    /// Without a constructor this reports the missing module when the
    /// registry names one that is not installed, and an unrecognized style
    /// otherwise.
    pub fn create(
        &self,
        name: &str,
        registry: &StyleRegistry,
        modules: &ModuleSet,
    ) -> Result<T, StyleError> {
        if let Some(constructor) = self.constructors.get(name) {
            return Ok(constructor(name));
        }
        match registry.lookup(self.category, name) {
            StyleOwner::Module(module) if !modules.is_installed(module) => {
                Err(StyleError::ModuleNotInstalled {
                    category: self.category,
                    name: name.to_string(),
                    module: module.to_string(),
                })
            }
            _ => Err(StyleError::Unresolvable {
                category: self.category,
                name: name.to_string(),
            }),
        }
    }
}

impl<T> fmt::Debug for StyleFactory<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StyleFactory")
            .field("category", &self.category)
            .field("styles", &self.constructors.keys().collect::<Vec<_>>())
            .finish()
    }
}
