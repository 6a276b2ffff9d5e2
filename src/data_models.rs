use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Facet counts keyed by filter group, then by facet value.
pub type FilterCounts = BTreeMap<String, BTreeMap<String, u64>>;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Asc => f.write_str("asc"),
            SortDirection::Desc => f.write_str("desc"),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SortDirective {
    pub field: String,
    pub direction: SortDirection,
}

impl SortDirective {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> SortDirective {
        SortDirective {
            field: field.into(),
            direction,
        }
    }

    /// Parses a sort control value such as `date` or `date:asc`.
    /// A bare field sorts descending; anything after a second `:` is ignored.
    pub fn parse(value: &str) -> Result<SortDirective> {
        let mut parts = value.split(':');
        let field = parts.next().unwrap_or_default();
        if field.is_empty() {
            return Err(Error::InvalidSort(value.to_string()));
        }
        match parts.next() {
            None | Some("desc") => Ok(SortDirective::new(field, SortDirection::Desc)),
            Some("asc") => Ok(SortDirective::new(field, SortDirection::Asc)),
            Some(_) => Err(Error::InvalidSort(value.to_string())),
        }
    }
}

/// The "any of these must match" set for a single filter group.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct FacetSelection {
    pub any: BTreeSet<String>,
}

/// Selected facet values for every known filter group.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(transparent)]
pub struct FilterSelection(BTreeMap<String, FacetSelection>);

impl FilterSelection {
    pub fn new() -> FilterSelection {
        FilterSelection::default()
    }

    /// Registers a group with an empty selection if it is not known yet.
    pub fn ensure_group(&mut self, group: &str) {
        self.0.entry(group.to_string()).or_default();
    }

    pub fn set(&mut self, group: &str, value: &str, selected: bool) {
        let selection = self.0.entry(group.to_string()).or_default();
        if selected {
            selection.any.insert(value.to_string());
        } else {
            selection.any.remove(value);
        }
    }

    pub fn selected(&self, group: &str) -> Option<&BTreeSet<String>> {
        self.0.get(group).map(|s| &s.any)
    }

    pub fn groups(&self) -> impl Iterator<Item = (&str, &BTreeSet<String>)> {
        self.0.iter().map(|(group, s)| (group.as_str(), &s.any))
    }

    pub fn is_empty(&self) -> bool {
        self.0.values().all(|s| s.any.is_empty())
    }
}

/// Sort and filter options that accompany a query.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchOptions {
    pub sort: Option<SortDirective>,
    pub filters: FilterSelection,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub text: String,
    pub options: SearchOptions,
}

/// A resolved search hit. `excerpt` is markup already escaped and highlighted by the provider.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ResultRecord {
    pub url: String,
    pub title: String,
    pub excerpt: String,
}

impl ResultRecord {
    pub fn new(url: String, title: String, excerpt: String) -> ResultRecord {
        ResultRecord {
            url,
            title,
            excerpt,
        }
    }
}

/// What a provider returns for a query that was not superseded.
#[derive(Debug)]
pub struct SearchResponse<H> {
    pub results: Vec<H>,
    pub total_filters: Option<FilterCounts>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_with_direction() {
        let sort = SortDirective::parse("date:asc").unwrap();
        assert_eq!(sort, SortDirective::new("date", SortDirection::Asc));
    }

    #[test]
    fn test_sort_defaults_to_descending() {
        let sort = SortDirective::parse("date").unwrap();
        assert_eq!(sort.field, "date");
        assert_eq!(sort.direction, SortDirection::Desc);
    }

    #[test]
    fn test_sort_rejects_unknown_direction() {
        let err = SortDirective::parse("date:sideways").unwrap_err();
        assert!(matches!(err, Error::InvalidSort(v) if v == "date:sideways"));
    }

    #[test]
    fn test_sort_ignores_extra_parts() {
        let sort = SortDirective::parse("date:asc:x").unwrap();
        assert_eq!(sort, SortDirective::new("date", SortDirection::Asc));
    }

    #[test]
    fn test_sort_requires_a_field() {
        assert!(matches!(SortDirective::parse(""), Err(Error::InvalidSort(_))));
        assert!(matches!(SortDirective::parse(":asc"), Err(Error::InvalidSort(_))));
    }

    #[test]
    fn test_filter_selection_toggle() {
        let mut filters = FilterSelection::new();
        filters.ensure_group("category");
        assert!(filters.is_empty());

        filters.set("category", "news", true);
        filters.set("category", "blog", true);
        filters.set("author", "sam", true);
        filters.set("category", "news", false);

        let category: Vec<_> = filters.selected("category").unwrap().iter().collect();
        assert_eq!(category, vec!["blog"]);
        assert!(filters.selected("author").unwrap().contains("sam"));
        assert!(!filters.is_empty());
    }

    #[test]
    fn test_filter_selection_wire_shape() {
        let mut filters = FilterSelection::new();
        filters.ensure_group("season");
        filters.set("category", "news", true);

        let json = serde_json::to_value(&filters).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "category": { "any": ["news"] },
                "season": { "any": [] }
            })
        );
    }
}
