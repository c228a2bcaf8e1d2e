//! Property normalization
//!
//! Converts one raw, type-tagged property value into a canonical value,
//! independent of source-specific labels. Pure and total over the closed
//! kind set: a kind the pipeline does not understand yields `None`, never
//! an error.

use crate::notion::types::{FormulaValue, RawPage, RawProperty, TextRun};
use std::collections::HashMap;
use wbs_common::config::PeopleDirectory;

/// A normalized property value
#[derive(Debug, Clone, PartialEq)]
pub enum CanonicalValue {
    /// Concatenated text runs (title, rich text, string formula)
    Text(String),
    /// A single select / status label
    Label(String),
    /// Ordered multi-select labels; empty selection stays an empty list
    Labels(Vec<String>),
    Number(f64),
    Bool(bool),
    /// A date value; `None` start/end are open-ended
    DateRange {
        start: Option<String>,
        end: Option<String>,
    },
    /// Resolved assignee display names
    People(Vec<String>),
    Url(String),
}

/// Normalize one raw property
///
/// Per-kind rules:
/// - title/rich_text: concatenate runs in order; an empty run list is `None`
///   (no value), distinct from an empty string
/// - select/status: the label name, or `None` when unset
/// - multi_select: ordered labels, `Some` even when empty
/// - number/checkbox/url: passthrough
/// - date: the `{start, end}` pair, `None` when unset
/// - people: each reference resolved through the directory, falling back to
///   the inline name, then the unassigned sentinel
/// - formula: recurse on the declared result kind (number/string/boolean)
pub fn normalize(property: &RawProperty, people: &PeopleDirectory) -> Option<CanonicalValue> {
    match property {
        RawProperty::Title { title } => join_runs(title),
        RawProperty::RichText { rich_text } => join_runs(rich_text),
        RawProperty::Select { select: option } | RawProperty::Status { status: option } => {
            option.as_ref().map(|o| CanonicalValue::Label(o.name.clone()))
        }
        RawProperty::MultiSelect { multi_select } => Some(CanonicalValue::Labels(
            multi_select.iter().map(|o| o.name.clone()).collect(),
        )),
        RawProperty::Number { number } => number.map(CanonicalValue::Number),
        RawProperty::Checkbox { checkbox } => Some(CanonicalValue::Bool(*checkbox)),
        RawProperty::Date { date } => date.as_ref().map(|d| CanonicalValue::DateRange {
            start: d.start.clone(),
            end: d.end.clone(),
        }),
        RawProperty::People { people: refs } => Some(CanonicalValue::People(
            refs.iter()
                .map(|p| people.resolve(&p.id, p.name.as_deref()))
                .collect(),
        )),
        RawProperty::Url { url } => url.clone().map(CanonicalValue::Url),
        RawProperty::Formula { formula } => match formula {
            FormulaValue::Number { number } => number.map(CanonicalValue::Number),
            FormulaValue::String { string } => string.clone().map(CanonicalValue::Text),
            FormulaValue::Boolean { boolean } => boolean.map(CanonicalValue::Bool),
            FormulaValue::Unsupported => None,
        },
        RawProperty::Unsupported => None,
    }
}

fn join_runs(runs: &[TextRun]) -> Option<CanonicalValue> {
    if runs.is_empty() {
        return None;
    }
    Some(CanonicalValue::Text(
        runs.iter().map(|r| r.plain_text.as_str()).collect(),
    ))
}

/// Normalized view over one raw record's properties
///
/// The item builder reads through this; each getter normalizes on demand and
/// quietly returns `None` when the property is absent or the wrong shape.
pub struct Properties<'a> {
    map: &'a HashMap<String, RawProperty>,
    people: &'a PeopleDirectory,
}

impl<'a> Properties<'a> {
    pub fn new(page: &'a RawPage, people: &'a PeopleDirectory) -> Self {
        Self {
            map: &page.properties,
            people,
        }
    }

    fn value(&self, name: &str) -> Option<CanonicalValue> {
        self.map.get(name).and_then(|p| normalize(p, self.people))
    }

    /// Any string-shaped value: text, label, url, string formula
    pub fn text(&self, name: &str) -> Option<String> {
        match self.value(name)? {
            CanonicalValue::Text(s) | CanonicalValue::Label(s) | CanonicalValue::Url(s) => Some(s),
            _ => None,
        }
        .filter(|s| !s.trim().is_empty())
    }

    pub fn number(&self, name: &str) -> Option<f64> {
        match self.value(name)? {
            CanonicalValue::Number(n) => Some(n),
            _ => None,
        }
    }

    /// Resolved assignees; empty when the property is absent or unset
    pub fn people(&self, name: &str) -> Vec<String> {
        match self.value(name) {
            Some(CanonicalValue::People(names)) => names,
            _ => Vec::new(),
        }
    }

    /// The start of a date value (single dates carry no end)
    pub fn date_start(&self, name: &str) -> Option<String> {
        match self.value(name)? {
            CanonicalValue::DateRange { start, .. } => start,
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap as StdHashMap;
    use uuid::Uuid;

    fn prop(value: serde_json::Value) -> RawProperty {
        serde_json::from_value(value).unwrap()
    }

    fn people() -> PeopleDirectory {
        let id = Uuid::parse_str("1e3d872b-594c-8148-a561-0002b1fa89c4").unwrap();
        PeopleDirectory::new(StdHashMap::from([(id, "Jane Doe".to_string())]))
    }

    #[test]
    fn title_concatenates_runs_in_order() {
        let value = normalize(
            &prop(json!({
                "type": "title",
                "title": [{"plain_text": "Smart "}, {"plain_text": "WiFi"}]
            })),
            &people(),
        );
        assert_eq!(value, Some(CanonicalValue::Text("Smart WiFi".to_string())));
    }

    #[test]
    fn empty_title_is_none_not_empty_string() {
        let value = normalize(&prop(json!({"type": "title", "title": []})), &people());
        assert_eq!(value, None);
    }

    #[test]
    fn select_and_status_extract_the_label() {
        let select = normalize(
            &prop(json!({"type": "select", "select": {"name": "P1", "color": "red"}})),
            &people(),
        );
        assert_eq!(select, Some(CanonicalValue::Label("P1".to_string())));

        let unset = normalize(&prop(json!({"type": "status", "status": null})), &people());
        assert_eq!(unset, None);
    }

    #[test]
    fn empty_multi_select_is_an_empty_list() {
        let value = normalize(
            &prop(json!({"type": "multi_select", "multi_select": []})),
            &people(),
        );
        assert_eq!(value, Some(CanonicalValue::Labels(Vec::new())));
    }

    #[test]
    fn people_resolve_through_directory_then_inline_then_sentinel() {
        let value = normalize(
            &prop(json!({
                "type": "people",
                "people": [
                    {"id": "1e3d872b-594c-8148-a561-0002b1fa89c4", "name": "stale"},
                    {"id": "9e9d872b-594c-8148-a561-0002b1fa89c4", "name": "Guest User"},
                    {"id": "0e0d872b-594c-8148-a561-0002b1fa89c4"}
                ]
            })),
            &people(),
        );
        assert_eq!(
            value,
            Some(CanonicalValue::People(vec![
                "Jane Doe".to_string(),
                "Guest User".to_string(),
                "unassigned".to_string(),
            ]))
        );
    }

    #[test]
    fn formula_recurses_on_result_kind() {
        let number = normalize(
            &prop(json!({"type": "formula", "formula": {"type": "number", "number": 0.42}})),
            &people(),
        );
        assert_eq!(number, Some(CanonicalValue::Number(0.42)));

        let text = normalize(
            &prop(json!({"type": "formula", "formula": {"type": "string", "string": "2.10.a"}})),
            &people(),
        );
        assert_eq!(text, Some(CanonicalValue::Text("2.10.a".to_string())));

        let date = normalize(
            &prop(json!({
                "type": "formula",
                "formula": {"type": "date", "date": {"start": "2026-03-01"}}
            })),
            &people(),
        );
        assert_eq!(date, None);
    }

    #[test]
    fn unsupported_kind_is_none() {
        let value = normalize(
            &prop(json!({"type": "relation", "relation": [{"id": "abc"}]})),
            &people(),
        );
        assert_eq!(value, None);
    }

    #[test]
    fn properties_getters_tolerate_wrong_shapes() {
        let page: RawPage = serde_json::from_value(json!({
            "id": "page-1",
            "properties": {
                "Weight": {"type": "number", "number": 12.5},
                "Status": {"type": "status", "status": {"name": "In progress"}},
                "Due": {"type": "date", "date": {"start": "2026-09-30", "end": null}}
            }
        }))
        .unwrap();
        let directory = PeopleDirectory::default();
        let props = Properties::new(&page, &directory);

        assert_eq!(props.number("Weight"), Some(12.5));
        assert_eq!(props.text("Status").as_deref(), Some("In progress"));
        assert_eq!(props.date_start("Due").as_deref(), Some("2026-09-30"));
        // Wrong shape and missing properties read as absent
        assert_eq!(props.number("Status"), None);
        assert_eq!(props.text("Missing"), None);
        assert!(props.people("Weight").is_empty());
    }
}
