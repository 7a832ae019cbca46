//! Build-target selection.

use serde::Serialize;

/// Build invocation chosen from the current branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BuildTarget {
    /// Value of `--target`.
    pub target: &'static str,
    /// Whether to rebuild on change.
    pub watch: bool,
}

/// Selects the build target for a branch.
///
/// `main`/`master` build everything, `feature/*` builds locally in watch
/// mode, `release/*` runs the layered build, and anything else builds
/// locally.
#[must_use]
pub fn build_target(branch: Option<&str>) -> BuildTarget {
    match branch {
        Some("main" | "master") => BuildTarget {
            target: "all",
            watch: false,
        },
        Some(name) if name.starts_with("feature/") => BuildTarget {
            target: "local",
            watch: true,
        },
        Some(name) if name.starts_with("release/") => BuildTarget {
            target: "layered",
            watch: false,
        },
        _ => BuildTarget {
            target: "local",
            watch: false,
        },
    }
}
