//! Wizard stages.

use serde::{Deserialize, Serialize};

/// Stage of the composition wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Choosing and resizing the layout.
    #[default]
    Layout,
    /// Assigning media to zones.
    Content,
    /// Choosing target devices.
    Targets,
    /// Publishing in progress.
    Submitted,
}

impl Stage {
    /// Number of operator-facing steps.
    pub const STEPS: usize = 3;

    /// Zero-based step index.
    pub fn index(&self) -> usize {
        match self {
            Stage::Layout => 0,
            Stage::Content => 1,
            Stage::Targets => 2,
            Stage::Submitted => 3,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Stage::Layout => "Layout",
            Stage::Content => "Content",
            Stage::Targets => "Devices",
            Stage::Submitted => "Publishing",
        }
    }

    /// The stage reached by moving forward one step, if the wizard allows
    /// it. `Targets` only advances through submission.
    pub fn next(&self) -> Option<Stage> {
        match self {
            Stage::Layout => Some(Stage::Content),
            Stage::Content => Some(Stage::Targets),
            Stage::Targets | Stage::Submitted => None,
        }
    }

    pub fn previous(&self) -> Option<Stage> {
        match self {
            Stage::Layout => None,
            Stage::Content => Some(Stage::Layout),
            Stage::Targets => Some(Stage::Content),
            Stage::Submitted => Some(Stage::Targets),
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.title())
    }
}
