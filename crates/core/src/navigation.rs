use std::{collections::BTreeSet, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::types::SubmissionKind;

/// Summary sub-section expanded by default.
pub const DEFAULT_SUMMARY_SECTION: &str = "summary";
/// The first timeline entry starts expanded.
pub const DEFAULT_TIMELINE_INDEX: usize = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultSection {
    #[default]
    Summarize,
    Viral,
    Recommendation,
}

impl ResultSection {
    pub const ALL: [ResultSection; 3] = [
        ResultSection::Summarize,
        ResultSection::Viral,
        ResultSection::Recommendation,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ResultSection::Summarize => "summarize",
            ResultSection::Viral => "viral",
            ResultSection::Recommendation => "recommendation",
        }
    }
}

impl fmt::Display for ResultSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ResultSection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResultSection::ALL
            .into_iter()
            .find(|section| section.name() == s)
            .ok_or_else(|| format!("unknown result section: {s}"))
    }
}

/// Symmetric toggle: present keys are removed, absent keys inserted.
pub fn toggle<T: Ord>(set: &mut BTreeSet<T>, key: T) {
    if set.contains(&key) {
        set.remove(&key);
    } else {
        set.insert(key);
    }
}

/// UI-agnostic navigation state around a result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationState {
    pub active_tab: SubmissionKind,
    pub active_section: ResultSection,
    pub expanded_timeline: BTreeSet<usize>,
    pub expanded_summary_sections: BTreeSet<String>,
}

impl Default for NavigationState {
    fn default() -> Self {
        Self {
            active_tab: SubmissionKind::default(),
            active_section: ResultSection::default(),
            expanded_timeline: BTreeSet::from([DEFAULT_TIMELINE_INDEX]),
            expanded_summary_sections: BTreeSet::from([DEFAULT_SUMMARY_SECTION.to_string()]),
        }
    }
}

impl NavigationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select_tab(&mut self, tab: SubmissionKind) {
        self.active_tab = tab;
    }

    pub fn select_section(&mut self, section: ResultSection) {
        self.active_section = section;
    }

    pub fn toggle_timeline(&mut self, index: usize) {
        toggle(&mut self.expanded_timeline, index);
    }

    pub fn toggle_summary_section(&mut self, key: impl Into<String>) {
        toggle(&mut self.expanded_summary_sections, key.into());
    }

    pub fn is_timeline_expanded(&self, index: usize) -> bool {
        self.expanded_timeline.contains(&index)
    }

    pub fn is_summary_section_expanded(&self, key: &str) -> bool {
        self.expanded_summary_sections.contains(key)
    }

    /// Restore result-view defaults. The input tab is the user's choice and
    /// survives a reset.
    pub fn reset(&mut self) {
        *self = Self {
            active_tab: self.active_tab,
            ..Self::default()
        };
    }
}
