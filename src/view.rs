//! Typed view models for the results surface.
//!
//! The controller never touches a concrete UI. It projects records and facet
//! counts into fragments and hands them to a [`ResultsView`].

use crate::data_models::{FilterCounts, ResultRecord};

/// One rendered search hit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultFragment {
    pub href: String,
    pub title: String,
    /// Inserted verbatim; the provider has already escaped and highlighted it.
    pub excerpt_html: String,
}

impl From<ResultRecord> for ResultFragment {
    fn from(record: ResultRecord) -> Self {
        ResultFragment {
            href: record.url,
            title: record.title,
            excerpt_html: record.excerpt,
        }
    }
}

/// A single facet checkbox with its label and "(N)" annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterRowFragment {
    pub group: String,
    pub facet: String,
    pub input_id: String,
    pub label: String,
    pub count_label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterGroupFragment {
    pub group: String,
    pub title: String,
    pub rows: Vec<FilterRowFragment>,
}

/// The UI surface driven by the controller.
pub trait ResultsView: Send + Sync {
    fn clear_output(&self);
    fn append_result(&self, fragment: ResultFragment);
    fn set_status(&self, status: &str);
    fn set_load_more_visible(&self, visible: bool);
    fn show_filter_groups(&self, groups: Vec<FilterGroupFragment>);
    fn set_facet_count(&self, group: &str, facet: &str, count_label: &str);
}

/// Builds one fragment per filter group, groups and facets in sorted order.
pub fn filter_groups(counts: &FilterCounts) -> Vec<FilterGroupFragment> {
    counts
        .iter()
        .map(|(group, facets)| FilterGroupFragment {
            group: group.clone(),
            title: kebab_to_title_case(group),
            rows: facets
                .iter()
                .map(|(facet, count)| FilterRowFragment {
                    group: group.clone(),
                    facet: facet.clone(),
                    input_id: format!("{group}-{}", kebab_case(facet)),
                    label: facet.clone(),
                    count_label: count_label(*count),
                })
                .collect(),
        })
        .collect()
}

pub fn count_label(count: u64) -> String {
    format!("({count})")
}

/// Status line shown after a query. Empty query text clears it.
pub fn status_line(count: usize, text: &str) -> String {
    if text.is_empty() {
        String::new()
    } else {
        format!("{count} results for {text}")
    }
}

fn is_word(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// `episode-type` becomes `Episode Type`. Hyphens are consumed left to right
/// in non-overlapping `x-y` pairs, so `a-b-c` becomes `A B-c`.
pub fn kebab_to_title_case(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut out = String::with_capacity(s.len());
    let mut i = 0;
    while i < chars.len() {
        if i + 2 < chars.len() && is_word(chars[i]) && chars[i + 1] == '-' && is_word(chars[i + 2])
        {
            out.push(chars[i]);
            out.push(' ');
            out.extend(chars[i + 2].to_uppercase());
            i += 3;
        } else {
            out.push(chars[i]);
            i += 1;
        }
    }

    let mut rest = out.chars();
    match rest.next() {
        Some(first) if is_word(first) => first.to_uppercase().chain(rest).collect(),
        _ => out,
    }
}

/// Lowercases and joins whitespace-separated words with hyphens. Every
/// whitespace run is replaced, not only the first space, so ids stay free of
/// spaces.
pub fn kebab_case(s: &str) -> String {
    s.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}
