//! # AT-Styles: Style Registry and Suffix Resolution
//!
//! A *style* is a named variant of a pluggable behaviour ("full" particle
//! kind, "lj/cut" pair interaction, ...). This crate answers two questions:
//!
//! - **Which module owns a style?** [`StyleRegistry::lookup`] maps
//!   `(category, name)` to the optional module that supplies it. Unknown names
//!   are reported as built-in; existence is checked later by the consuming
//!   [`StyleFactory`].
//! - **Which variant should be instantiated?** [`SuffixResolver::resolve`]
//!   prefers a backend-specialised variant (`lj/cut/omp`, `full/kk`) when the
//!   Context's [`SuffixState`] enables one and the variant is registered.
//!
//! ```rust,ignore
//! use at_styles::{StyleCategory, StyleRegistry, SuffixResolver, SuffixState};
//!
//! let registry = StyleRegistry::bootstrap();
//! let suffix = SuffixState::single("omp")?;
//! let resolver = SuffixResolver::new(registry, &suffix);
//! assert_eq!(resolver.resolve(StyleCategory::Pair, "lj/cut"), "lj/cut/omp");
//! ```

mod factory;
mod modules;
mod registry;
mod suffix;

pub use factory::{StyleConstructor, StyleFactory};
pub use modules::{ModuleSet, ACCELERATOR_MODULE, MOLECULE_MODULE, THREADS_MODULE};
pub use registry::{
    StyleCategory, StyleOwner, StyleRegistry, StyleRegistryBuilder, ACCELERATOR_TAGS,
};
pub use suffix::{Resolution, SuffixResolver, SuffixState, SuffixTier};

use thiserror::Error;

/// Style errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StyleError {
    #[error("Suffix must be a non-empty string")]
    EmptySuffix,

    #[error("Unknown style category '{0}'")]
    UnknownCategory(String),

    #[error("Unrecognized {category} style '{name}'")]
    Unresolvable {
        category: StyleCategory,
        name: String,
    },

    #[error(
        "Unrecognized {category} style '{name}' is part of the {module} module \
         which is not enabled in this build"
    )]
    ModuleNotInstalled {
        category: StyleCategory,
        name: String,
        module: String,
    },
}
