use std::collections::BTreeMap;
use std::sync::Mutex;

use html2text::from_read;

use crate::view::{FilterGroupFragment, ResultFragment, ResultsView};

const WRAP_WIDTH: usize = 80;

/// A line typed at the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Search(String),
    More,
    Sort(Option<String>),
    Filter {
        group: String,
        value: String,
        selected: bool,
    },
    Filters,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Result<Command, String> {
        let line = line.trim_end_matches(['\r', '\n']);
        let Some(rest) = line.strip_prefix(':') else {
            return Ok(Command::Search(line.trim().to_string()));
        };

        let mut words = rest.split_whitespace();
        match words.next() {
            Some("more") => Ok(Command::More),
            Some("quit") | Some("q") => Ok(Command::Quit),
            Some("filters") => Ok(Command::Filters),
            Some("sort") => match words.next() {
                None | Some("none") => Ok(Command::Sort(None)),
                Some(value) => Ok(Command::Sort(Some(value.to_string()))),
            },
            Some("filter") => {
                let group = words.next().ok_or("usage: :filter <group> <value> on|off")?;
                let mut rest: Vec<&str> = words.collect();
                let selected = match rest.pop() {
                    Some("on") => true,
                    Some("off") => false,
                    _ => return Err("usage: :filter <group> <value> on|off".to_string()),
                };
                if rest.is_empty() {
                    return Err("usage: :filter <group> <value> on|off".to_string());
                }
                Ok(Command::Filter {
                    group: group.to_string(),
                    value: rest.join(" "),
                    selected,
                })
            }
            Some(other) => Err(format!("unknown command :{other}")),
            None => Err("empty command".to_string()),
        }
    }
}

/// Prints fragments to stdout. Excerpt markup is flattened to text.
#[derive(Default)]
pub struct TerminalView {
    groups: Mutex<Vec<FilterGroupFragment>>,
    counts: Mutex<BTreeMap<(String, String), String>>,
}

impl TerminalView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prints every filter group with its latest counts.
    pub fn print_filters(&self) {
        let (Ok(groups), Ok(counts)) = (self.groups.lock(), self.counts.lock()) else {
            return;
        };
        for group in groups.iter() {
            println!("{} [{}]", group.title, group.group);
            for row in &group.rows {
                let count = counts
                    .get(&(row.group.clone(), row.facet.clone()))
                    .unwrap_or(&row.count_label);
                println!("  {} {}", row.label, count);
            }
        }
    }
}

pub fn excerpt_text(excerpt_html: &str) -> String {
    match from_read(excerpt_html.as_bytes(), WRAP_WIDTH) {
        Ok(text) => text.trim_end().to_string(),
        Err(e) => {
            log::debug!("excerpt left as markup: {e}");
            excerpt_html.to_string()
        }
    }
}

impl ResultsView for TerminalView {
    fn clear_output(&self) {
        println!("{}", "-".repeat(WRAP_WIDTH));
    }

    fn append_result(&self, fragment: ResultFragment) {
        println!("{}\n  {}", fragment.title, fragment.href);
        for line in excerpt_text(&fragment.excerpt_html).lines() {
            println!("  {line}");
        }
        println!();
    }

    fn set_status(&self, status: &str) {
        if !status.is_empty() {
            println!("{status}");
        }
    }

    fn set_load_more_visible(&self, visible: bool) {
        if visible {
            println!("(:more for more results)");
        }
    }

    fn show_filter_groups(&self, groups: Vec<FilterGroupFragment>) {
        if let Ok(mut current) = self.groups.lock() {
            *current = groups;
        }
        self.print_filters();
    }

    fn set_facet_count(&self, group: &str, facet: &str, count_label: &str) {
        if let Ok(mut counts) = self.counts.lock() {
            counts.insert(
                (group.to_string(), facet.to_string()),
                count_label.to_string(),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_a_search() {
        assert_eq!(
            Command::parse("black cat\n").unwrap(),
            Command::Search("black cat".to_string())
        );
        assert_eq!(Command::parse("").unwrap(), Command::Search(String::new()));
    }

    #[test]
    fn test_sort_commands() {
        assert_eq!(
            Command::parse(":sort date:asc").unwrap(),
            Command::Sort(Some("date:asc".to_string()))
        );
        assert_eq!(Command::parse(":sort none").unwrap(), Command::Sort(None));
        assert_eq!(Command::parse(":sort").unwrap(), Command::Sort(None));
    }

    #[test]
    fn test_filter_command_with_spaced_value() {
        assert_eq!(
            Command::parse(":filter episode-type Bonus Cut on").unwrap(),
            Command::Filter {
                group: "episode-type".to_string(),
                value: "Bonus Cut".to_string(),
                selected: true,
            }
        );
        assert!(Command::parse(":filter season on").is_err());
        assert!(Command::parse(":filter season one maybe").is_err());
    }

    #[test]
    fn test_unknown_command() {
        assert!(Command::parse(":jump").is_err());
        assert_eq!(Command::parse(":q").unwrap(), Command::Quit);
        assert_eq!(Command::parse(":more").unwrap(), Command::More);
    }

    #[test]
    fn test_excerpt_text_strips_markup() {
        let text = excerpt_text("the <mark>cat</mark> sat");
        assert!(text.contains("cat"));
        assert!(!text.contains("<mark>"));
    }
}
