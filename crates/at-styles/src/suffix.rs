//! Suffix state and the suffix-fallback resolver.

use std::borrow::Cow;
use std::fmt;

use serde::Serialize;

use crate::{StyleCategory, StyleError, StyleRegistry};

/// Active style suffixes of one Context.
///
/// Enabled exactly when at least one suffix is set; suffixes are never empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SuffixState {
    primary: Option<String>,
    secondary: Option<String>,
}

impl SuffixState {
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn single(suffix: impl Into<String>) -> Result<Self, StyleError> {
        Self::from_parts(Some(suffix.into()), None)
    }

    /// `-sf hybrid <primary> <secondary>`
    pub fn hybrid(
        primary: impl Into<String>,
        secondary: impl Into<String>,
    ) -> Result<Self, StyleError> {
        Self::from_parts(Some(primary.into()), Some(secondary.into()))
    }

    pub fn from_parts(
        primary: Option<String>,
        secondary: Option<String>,
    ) -> Result<Self, StyleError> {
        if primary.as_deref() == Some("") || secondary.as_deref() == Some("") {
            return Err(StyleError::EmptySuffix);
        }
        Ok(Self { primary, secondary })
    }

    pub fn is_enabled(&self) -> bool {
        self.primary.is_some() || self.secondary.is_some()
    }

    pub fn primary(&self) -> Option<&str> {
        self.primary.as_deref()
    }

    pub fn secondary(&self) -> Option<&str> {
        self.secondary.as_deref()
    }

    /// Set suffixes in probing order.
    pub fn suffixes(&self) -> impl Iterator<Item = &str> {
        self.primary().into_iter().chain(self.secondary())
    }

    pub fn contains(&self, suffix: &str) -> bool {
        self.suffixes().any(|s| s == suffix)
    }
}

impl fmt::Display for SuffixState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.primary(), self.secondary()) {
            (None, None) => f.write_str("none"),
            (Some(p), None) => f.write_str(p),
            (None, Some(s)) => write!(f, "(none) {s}"),
            (Some(p), Some(s)) => write!(f, "hybrid {p} {s}"),
        }
    }
}

/// Which suffix served a resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuffixTier {
    Primary,
    Secondary,
}

/// Outcome of one resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution<'n> {
    pub name: Cow<'n, str>,
    /// `None` when the base name was kept.
    pub tier: Option<SuffixTier>,
}

impl Resolution<'_> {
    /// Label for logs and metrics: `primary`, `secondary` or `base`.
    pub fn outcome(&self) -> &'static str {
        match self.tier {
            Some(SuffixTier::Primary) => "primary",
            Some(SuffixTier::Secondary) => "secondary",
            None => "base",
        }
    }
}

/// Picks the concrete style variant to instantiate.
#[derive(Debug, Clone, Copy)]
pub struct SuffixResolver<'a> {
    registry: &'a StyleRegistry,
    state: &'a SuffixState,
}

impl<'a> SuffixResolver<'a> {
    pub fn new(registry: &'a StyleRegistry, state: &'a SuffixState) -> Self {
        Self { registry, state }
    }

    pub fn state(&self) -> &SuffixState {
        self.state
    }

    pub fn registry(&self) -> &StyleRegistry {
        self.registry
    }

    /// `requested/<primary>` if a module owns it, else `requested/<secondary>`
    /// if a module owns that, else `requested` unchanged.
    pub fn resolve<'n>(&self, category: StyleCategory, requested: &'n str) -> Cow<'n, str> {
        self.resolve_detailed(category, requested).name
    }

    pub fn resolve_detailed<'n>(
        &self,
        category: StyleCategory,
        requested: &'n str,
    ) -> Resolution<'n> {
        if self.state.suffixes().any(|suffix| carries_suffix(requested, suffix)) {
            return Resolution {
                name: Cow::Borrowed(requested),
                tier: None,
            };
        }
        let tiers = [
            (SuffixTier::Primary, self.state.primary()),
            (SuffixTier::Secondary, self.state.secondary()),
        ];
        for (tier, suffix) in tiers {
            let Some(suffix) = suffix else {
                continue;
            };
            let candidate = format!("{requested}/{suffix}");
            if self.registry.lookup(category, &candidate).is_module() {
                return Resolution {
                    name: Cow::Owned(candidate),
                    tier: Some(tier),
                };
            }
        }
        Resolution {
            name: Cow::Borrowed(requested),
            tier: None,
        }
    }
}

/// `requested` already names a `/suffix` variant.
fn carries_suffix(requested: &str, suffix: &str) -> bool {
    requested
        .strip_suffix(suffix)
        .is_some_and(|stem| stem.ends_with('/'))
}
