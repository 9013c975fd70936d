//! Time integration, modifiers, groups, output and timing.

use std::any::Any;
use std::borrow::Cow;
use std::time::{Duration, Instant};

use at_styles::StyleCategory;
use parking_lot::Mutex;
use serde_json::json;
use shared_types::{Subsystem, SubsystemKind};

use super::StyleContext;
use crate::container::BuildScope;

/// Time-stepper.
#[derive(Debug)]
pub struct Integrator {
    style: String,
    timestep: f64,
}

impl Integrator {
    pub const DEFAULT_STYLE: &'static str = "verlet";
    pub const DEFAULT_TIMESTEP: f64 = 0.005;

    pub(crate) fn build(scope: &BuildScope<'_>) -> Self {
        Self {
            style: scope.resolve(StyleCategory::Integrate, Self::DEFAULT_STYLE),
            timestep: Self::DEFAULT_TIMESTEP,
        }
    }

    pub fn style(&self) -> &str {
        &self.style
    }

    pub fn timestep(&self) -> f64 {
        self.timestep
    }
}

impl Subsystem for Integrator {
    fn kind(&self) -> SubsystemKind {
        SubsystemKind::Update
    }

    fn describe(&self) -> serde_json::Value {
        json!({ "name": self.name(), "style": self.style, "timestep": self.timestep })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Registry of fixes and computes.
#[derive(Debug)]
pub struct ModifierRegistry {
    resolver: StyleContext,
}

impl ModifierRegistry {
    pub(crate) fn build(scope: &BuildScope<'_>) -> Self {
        Self {
            resolver: StyleContext::from_scope(scope),
        }
    }

    /// Concrete fix style for `requested`.
    pub fn fix_style<'n>(&self, requested: &'n str) -> Cow<'n, str> {
        self.resolver.resolve(StyleCategory::Fix, requested)
    }
}

impl Subsystem for ModifierRegistry {
    fn kind(&self) -> SubsystemKind {
        SubsystemKind::Modify
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub const MAX_GROUPS: usize = 32;

/// Named particle groups. Group 0 is `all`.
#[derive(Debug)]
pub struct GroupManager {
    names: Mutex<Vec<String>>,
}

impl GroupManager {
    pub fn new() -> Self {
        Self {
            names: Mutex::new(vec!["all".to_string()]),
        }
    }

    /// Index of `name`, creating the group if needed. `None` once
    /// [`MAX_GROUPS`] groups exist.
    pub fn find_or_create(&self, name: &str) -> Option<usize> {
        let mut names = self.names.lock();
        if let Some(index) = names.iter().position(|n| n == name) {
            return Some(index);
        }
        if names.len() >= MAX_GROUPS {
            return None;
        }
        names.push(name.to_string());
        Some(names.len() - 1)
    }

    pub fn find(&self, name: &str) -> Option<usize> {
        self.names.lock().iter().position(|n| n == name)
    }

    pub fn len(&self) -> usize {
        self.names.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.lock().is_empty()
    }
}

impl Default for GroupManager {
    fn default() -> Self {
        Self::new()
    }
}

impl Subsystem for GroupManager {
    fn kind(&self) -> SubsystemKind {
        SubsystemKind::Group
    }

    fn describe(&self) -> serde_json::Value {
        json!({ "name": self.name(), "groups": self.names.lock().clone() })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Thermo and dump output, written to whichever channels are open.
#[derive(Debug)]
pub struct OutputManager {
    to_screen: bool,
    to_log: bool,
}

impl OutputManager {
    pub(crate) fn build(scope: &BuildScope<'_>) -> Self {
        Self {
            to_screen: scope.screen.is_some(),
            to_log: scope.log.is_some(),
        }
    }

    pub fn to_screen(&self) -> bool {
        self.to_screen
    }

    pub fn to_log(&self) -> bool {
        self.to_log
    }
}

impl Subsystem for OutputManager {
    fn kind(&self) -> SubsystemKind {
        SubsystemKind::Output
    }

    fn describe(&self) -> serde_json::Value {
        json!({
            "name": self.name(),
            "screen": self.to_screen,
            "log": self.to_log,
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Debug)]
pub struct Timer {
    started: Instant,
}

impl Timer {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Subsystem for Timer {
    fn kind(&self) -> SubsystemKind {
        SubsystemKind::Timer
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
