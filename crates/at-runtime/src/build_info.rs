//! Build metadata value object.

use serde::Serialize;

/// Placeholder reported for every git field when the build had no git
/// metadata.
pub const UNKNOWN: &str = "(unknown)";

/// Version and git provenance of this binary.
///
/// Produced once with [`BuildInfo::current`] and handed to the Context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildInfo {
    pub version: &'static str,
    pub git_commit: &'static str,
    pub git_branch: &'static str,
    pub git_descriptor: &'static str,
}

impl BuildInfo {
    pub fn current() -> Self {
        match (
            option_env!("ATOMICA_GIT_COMMIT"),
            option_env!("ATOMICA_GIT_BRANCH"),
            option_env!("ATOMICA_GIT_DESCRIPTOR"),
        ) {
            (Some(commit), Some(branch), Some(descriptor)) => Self {
                version: env!("CARGO_PKG_VERSION"),
                git_commit: commit,
                git_branch: branch,
                git_descriptor: descriptor,
            },
            _ => Self::without_git(),
        }
    }

    pub fn without_git() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION"),
            git_commit: UNKNOWN,
            git_branch: UNKNOWN,
            git_descriptor: UNKNOWN,
        }
    }

    pub fn has_git_info(&self) -> bool {
        self.git_commit != UNKNOWN
    }
}
