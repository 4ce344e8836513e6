//! Output context: decides whether progress bars are drawn

use std::io::IsTerminal;

/// Environment variables whose presence means "running in CI"
const CI_VARS: &[&str] = &[
    "CI",
    "GITHUB_ACTIONS",
    "GITLAB_CI",
    "CIRCLECI",
    "BUILDKITE",
    "JENKINS_URL",
    "TF_BUILD",
    // Concourse
    "ATC_EXTERNAL_URL",
];

/// Set to any value to never draw progress bars
pub const NO_PROGRESS_VAR: &str = "MODCACHE_NO_PROGRESS";

/// UI context that determines output behavior
#[derive(Debug, Clone)]
pub struct UiContext {
    progress: bool,
}

impl UiContext {
    /// Detect the current environment
    pub fn detect() -> Self {
        let in_ci = CI_VARS
            .iter()
            .chain(std::iter::once(&NO_PROGRESS_VAR))
            .any(|var| std::env::var_os(var).is_some());

        Self {
            progress: std::io::stderr().is_terminal() && !in_ci,
        }
    }

    /// Create a context that never draws progress (tests, explicit CI mode)
    pub fn non_interactive() -> Self {
        Self { progress: false }
    }

    /// Whether progress bars should be drawn on stderr
    pub fn use_fancy_output(&self) -> bool {
        self.progress
    }
}
