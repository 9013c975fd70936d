//! Static `(category, name) -> module` table.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use serde::Serialize;
use tracing::warn;

use crate::modules::{ACCELERATOR_MODULE, MOLECULE_MODULE, THREADS_MODULE};
use crate::StyleError;

/// Name endings that route a style to the accelerator module, whatever the
/// base name.
pub const ACCELERATOR_TAGS: [&str; 3] = ["/kk", "/kk/host", "/kk/device"];

/// Independent style namespaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StyleCategory {
    /// Particle kinds.
    Atom,
    Pair,
    Fix,
    Integrate,
    Comm,
    /// Variants of the allocator and particle container themselves.
    Core,
}

impl StyleCategory {
    pub const ALL: [StyleCategory; 6] = [
        StyleCategory::Atom,
        StyleCategory::Pair,
        StyleCategory::Fix,
        StyleCategory::Integrate,
        StyleCategory::Comm,
        StyleCategory::Core,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StyleCategory::Atom => "atom",
            StyleCategory::Pair => "pair",
            StyleCategory::Fix => "fix",
            StyleCategory::Integrate => "integrate",
            StyleCategory::Comm => "comm",
            StyleCategory::Core => "core",
        }
    }
}

impl fmt::Display for StyleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StyleCategory {
    type Err = StyleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| StyleError::UnknownCategory(s.to_string()))
    }
}

/// Who supplies a style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StyleOwner {
    /// Needs no optional module. Also returned for names the table does not
    /// know.
    BuiltIn,
    Module(&'static str),
}

impl StyleOwner {
    pub fn module(&self) -> Option<&'static str> {
        match self {
            StyleOwner::BuiltIn => None,
            StyleOwner::Module(m) => Some(*m),
        }
    }

    pub fn is_module(&self) -> bool {
        matches!(self, StyleOwner::Module(_))
    }
}

impl fmt::Display for StyleOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StyleOwner::BuiltIn => f.write_str("built-in"),
            StyleOwner::Module(m) => f.write_str(m),
        }
    }
}

/// Particle kinds and the optional modules that supply them.
const ATOM_STYLES: &[(&str, &[&str])] = &[
    (MOLECULE_MODULE, &["angle", "bond", "full", "molecular", "template"]),
    ("DIPOLE", &["dipole"]),
    ("PERI", &["peri"]),
    ("SPIN", &["spin"]),
    ("AWPMD", &["wavepacket"]),
    ("DPD", &["dpd"]),
    ("MESODPD", &["edpd", "mdpd", "tdpd"]),
    ("SMD", &["smd"]),
    ("SPH", &["meso"]),
];

const PAIR_STYLES: &[(&str, &[&str])] = &[
    (THREADS_MODULE, &["lj/cut/omp", "lj/cut/coul/long/omp", "eam/omp", "morse/omp"]),
    ("OPT", &["lj/cut/opt", "eam/opt", "morse/opt"]),
    ("KSPACE", &["lj/cut/coul/long"]),
    ("MANYBODY", &["eam", "tersoff", "sw"]),
];

const FIX_STYLES: &[(&str, &[&str])] = &[
    (THREADS_MODULE, &["nve/omp", "nvt/omp", "rigid/omp"]),
    ("RIGID", &["rigid", "shake"]),
];

const INTEGRATE_STYLES: &[(&str, &[&str])] = &[(THREADS_MODULE, &["respa/omp"])];

/// Immutable style table.
///
/// Built once, then only read; lookups for the same key always return the
/// same answer.
#[derive(Debug, Clone, Default)]
pub struct StyleRegistry {
    table: BTreeMap<StyleCategory, BTreeMap<String, &'static str>>,
}

static STANDARD_STYLES: OnceLock<StyleRegistry> = OnceLock::new();

impl StyleRegistry {
    /// The process-wide standard table.
    pub fn bootstrap() -> &'static StyleRegistry {
        STANDARD_STYLES.get_or_init(Self::standard)
    }

    /// A fresh copy of the standard table.
    pub fn standard() -> Self {
        let sections = [
            (StyleCategory::Atom, ATOM_STYLES),
            (StyleCategory::Pair, PAIR_STYLES),
            (StyleCategory::Fix, FIX_STYLES),
            (StyleCategory::Integrate, INTEGRATE_STYLES),
        ];
        sections
            .into_iter()
            .fold(Self::builder(), |builder, (category, modules)| {
                modules.iter().fold(builder, |b, (module, names)| {
                    b.module(*module, category, names)
                })
            })
            .build()
    }

    pub fn builder() -> StyleRegistryBuilder {
        StyleRegistryBuilder::default()
    }

    /// Owner of `name` within `category`.
    ///
    /// Exact, case-sensitive match. Accelerator-tagged names map to the
    /// accelerator module in every category.
    pub fn lookup(&self, category: StyleCategory, name: &str) -> StyleOwner {
        if is_accelerator_name(name) {
            return StyleOwner::Module(ACCELERATOR_MODULE);
        }
        self.table
            .get(&category)
            .and_then(|styles| styles.get(name))
            .map_or(StyleOwner::BuiltIn, |m| StyleOwner::Module(*m))
    }

    /// Module required by `name`, `None` when built-in.
    pub fn match_style(&self, category: StyleCategory, name: &str) -> Option<&'static str> {
        self.lookup(category, name).module()
    }

    /// Whether the table carries an explicit entry for `name`.
    pub fn contains(&self, category: StyleCategory, name: &str) -> bool {
        self.table
            .get(&category)
            .is_some_and(|styles| styles.contains_key(name))
    }

    /// Explicit entries of one category, sorted by name.
    pub fn styles(&self, category: StyleCategory) -> impl Iterator<Item = (&str, &'static str)> + '_ {
        self.table
            .get(&category)
            .into_iter()
            .flat_map(|styles| styles.iter().map(|(n, m)| (n.as_str(), *m)))
    }

    pub fn len(&self) -> usize {
        self.table.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn is_accelerator_name(name: &str) -> bool {
    ACCELERATOR_TAGS
        .iter()
        .any(|tag| name.len() > tag.len() && name.ends_with(tag))
}

/// Append-only construction of a [`StyleRegistry`].
#[derive(Debug, Default)]
pub struct StyleRegistryBuilder {
    table: BTreeMap<StyleCategory, BTreeMap<String, &'static str>>,
}

impl StyleRegistryBuilder {
    /// Register one style. A second registration of the same key keeps the
    /// first owner.
    pub fn entry(
        mut self,
        category: StyleCategory,
        name: impl Into<String>,
        module: &'static str,
    ) -> Self {
        let name = name.into();
        let styles = self.table.entry(category).or_default();
        match styles.get(&name) {
            Some(existing) if *existing != module => {
                warn!(
                    "[Styles] {} style '{}' already owned by {}, ignoring {}",
                    category, name, existing, module
                );
            }
            Some(_) => {}
            None => {
                styles.insert(name, module);
            }
        }
        self
    }

    /// Register every name in `names` as owned by `module`.
    pub fn module(self, module: &'static str, category: StyleCategory, names: &[&str]) -> Self {
        names
            .iter()
            .fold(self, |b, name| b.entry(category, *name, module))
    }

    pub fn build(self) -> StyleRegistry {
        StyleRegistry { table: self.table }
    }
}
