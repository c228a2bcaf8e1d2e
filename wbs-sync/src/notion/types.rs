//! Notion API wire types
//!
//! Property values are internally tagged on the `type` field, so dispatch
//! over the closed kind set is an exhaustive match instead of a chain of
//! string comparisons. Kinds this pipeline does not understand deserialize
//! into `RawProperty::Unsupported` rather than failing the page.

use serde::Deserialize;
use std::collections::HashMap;

/// One database-query response page
#[derive(Debug, Clone, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub results: Vec<RawPage>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

/// One raw record as returned by the source
#[derive(Debug, Clone, Deserialize)]
pub struct RawPage {
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub last_edited_time: Option<String>,
    #[serde(default)]
    pub properties: HashMap<String, RawProperty>,
}

/// A type-tagged property value
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RawProperty {
    Title {
        #[serde(default)]
        title: Vec<TextRun>,
    },
    RichText {
        #[serde(default)]
        rich_text: Vec<TextRun>,
    },
    Select {
        select: Option<SelectOption>,
    },
    Status {
        status: Option<SelectOption>,
    },
    MultiSelect {
        #[serde(default)]
        multi_select: Vec<SelectOption>,
    },
    Number {
        number: Option<f64>,
    },
    Checkbox {
        #[serde(default)]
        checkbox: bool,
    },
    Date {
        date: Option<DateValue>,
    },
    People {
        #[serde(default)]
        people: Vec<PersonRef>,
    },
    Url {
        url: Option<String>,
    },
    Formula {
        formula: FormulaValue,
    },
    /// Any kind outside the closed set (rollup, relation, files, ...)
    #[serde(other)]
    Unsupported,
}

/// One run of text inside a title or rich-text property
#[derive(Debug, Clone, Deserialize)]
pub struct TextRun {
    #[serde(default)]
    pub plain_text: String,
}

/// A select / status / multi-select option
#[derive(Debug, Clone, Deserialize)]
pub struct SelectOption {
    pub name: String,
}

/// A date property value; `end` is set only for ranges
#[derive(Debug, Clone, Deserialize)]
pub struct DateValue {
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
}

/// A person reference; `name` is the inline fallback the source may attach
#[derive(Debug, Clone, Deserialize)]
pub struct PersonRef {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// A formula result, tagged by its declared result kind
///
/// Only number/string/boolean results are meaningful to the pipeline; date
/// and anything newer deserialize as `Unsupported`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FormulaValue {
    Number { number: Option<f64> },
    String { string: Option<String> },
    Boolean { boolean: Option<bool> },
    #[serde(other)]
    Unsupported,
}
