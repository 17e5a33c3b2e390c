//! Declarative heading-label tables for the tabbed detail sections.

use crate::types::TextField;

/// A tab whose `h3` headings label lists of linked names.
///
/// When several headings map to the same field the first one on the page
/// wins, so "Producer" is not replaced by a later "Executive Producer" and
/// "Primary Language" is not replaced by "Spoken Languages".
#[derive(Debug, Clone, Copy)]
pub struct RoleTable {
    pub tab_id: &'static str,
    /// Element inside each `h3` holding the heading text
    pub heading: &'static str,
    pub labels: &'static [(&'static str, TextField)],
}

pub const CREW_ROLES: RoleTable = RoleTable {
    tab_id: "tab-crew",
    heading: "span.crewrole.-full",
    labels: &[
        ("Writer", TextField::Writer),
        ("Editor", TextField::Editor),
        ("Cinematography", TextField::Cinematography),
        ("Producer", TextField::Producer),
        ("Composer", TextField::Composer),
    ],
};

pub const DETAIL_ROLES: RoleTable = RoleTable {
    tab_id: "tab-details",
    heading: "span",
    labels: &[
        ("Studio", TextField::Studio),
        ("Country", TextField::Country),
        ("Language", TextField::PrimaryLanguage),
    ],
};

pub const GENRE_ROLES: RoleTable = RoleTable {
    tab_id: "tab-genres",
    heading: "span",
    labels: &[("Genres", TextField::Genres), ("Themes", TextField::Themes)],
};

pub const ROLE_TABLES: [RoleTable; 3] = [CREW_ROLES, DETAIL_ROLES, GENRE_ROLES];

pub const RELEASES_TAB: &str = "tab-releases";

/// Release headings are matched exactly, not by containment.
pub const RELEASE_LABELS: &[(&str, TextField)] = &[
    ("Theatrical", TextField::FirstTheatricalRelease),
    ("Digital", TextField::OttRelease),
];

/// First label contained in `heading`, ignoring case.
pub fn match_label_contains(heading: &str, labels: &[(&str, TextField)]) -> Option<TextField> {
    let heading = heading.to_lowercase();
    labels
        .iter()
        .find(|(label, _)| heading.contains(&label.to_lowercase()))
        .map(|(_, field)| *field)
}

/// First label equal to `heading`, ignoring case.
pub fn match_label_exact(heading: &str, labels: &[(&str, TextField)]) -> Option<TextField> {
    let heading = heading.trim().to_lowercase();
    labels
        .iter()
        .find(|(label, _)| heading == label.to_lowercase())
        .map(|(_, field)| *field)
}
