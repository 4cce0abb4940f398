//! OData query-parameter engine.
//!
//! Parses `$top`, `$skip`, `$select`, `$expand`, `$filter` and `$orderby`
//! and applies them to collections and single documents. Parsing is strict
//! for the numeric parameters; everything else is lenient and unrecognised
//! input leaves the result unchanged.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use thiserror::Error;

use crate::resources::{Collection, ResourceKind};

static FILTER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*([A-Za-z][A-Za-z0-9_]*)\s+eq\s+(?:'([^']*)'|"([^"]*)")\s*$"#)
        .expect("static regex is valid")
});

/// Rejected query parameter.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("The value '{value}' for the query parameter {name} is not a non-negative integer")]
    NotANonNegativeInteger { name: &'static str, value: String },
}

/// Parsed query options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pub top: Option<usize>,
    pub skip: Option<usize>,
    pub select: Vec<String>,
    pub expand: Vec<String>,
    pub filter: Option<String>,
    /// Recorded but not applied.
    pub order_by: Option<String>,
}

impl QueryParams {
    /// Parse decoded `(key, value)` pairs. Keys without a `$` prefix are ignored.
    pub fn parse<'a, I>(pairs: I) -> Result<Self, QueryError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut params = Self::default();
        for (key, value) in pairs {
            match key {
                "$top" => params.top = Some(parse_count("$top", value)?),
                "$skip" => params.skip = Some(parse_count("$skip", value)?),
                "$select" => params.select = split_list(value),
                "$expand" => params.expand = split_list(value),
                "$filter" => params.filter = Some(value.to_string()),
                "$orderby" => params.order_by = Some(value.to_string()),
                _ => {}
            }
        }
        Ok(params)
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Window `items` to `[skip, skip + top)`, clamped to the input length.
    pub fn paginate<T>(&self, items: Vec<T>) -> Vec<T> {
        items
            .into_iter()
            .skip(self.skip.unwrap_or(0))
            .take(self.top.unwrap_or(usize::MAX))
            .collect()
    }

    /// Apply `$filter` then paging to a collection.
    ///
    /// `resolve` projects a member link into its document so the filter can
    /// inspect member fields. The member count tracks the returned members.
    pub fn apply_to_collection<F>(
        &self,
        mut collection: Collection,
        kind: ResourceKind,
        resolve: F,
    ) -> Collection
    where
        F: Fn(&str) -> Option<Value>,
    {
        let mut members = std::mem::take(&mut collection.members);
        if let Some(clause) = self
            .filter
            .as_deref()
            .and_then(FilterClause::parse)
            .filter(|c| kind.filterable_fields().contains(&c.field.as_str()))
        {
            members.retain(|link| resolve(&link.odata_id).is_some_and(|doc| clause.matches(&doc)));
        }
        collection.set_members(self.paginate(members));
        collection
    }

    /// Apply `$expand` then `$select` to a single document.
    pub fn apply_to_document<F>(&self, mut document: Value, kind: ResourceKind, resolve: F) -> Value
    where
        F: Fn(&str) -> Option<Value>,
    {
        for relation in &self.expand {
            if kind.expandable_relations().contains(&relation.as_str()) {
                expand_relation(&mut document, relation, &resolve);
            }
        }
        select_fields(&mut document, &self.select);
        document
    }
}

fn parse_count(name: &'static str, value: &str) -> Result<usize, QueryError> {
    let invalid = || QueryError::NotANonNegativeInteger {
        name,
        value: value.to_string(),
    };
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    value.parse().map_err(|_| invalid())
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// A recognised `<Field> eq '<value>'` expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterClause {
    pub field: String,
    pub value: String,
}

impl FilterClause {
    pub fn parse(expr: &str) -> Option<Self> {
        let caps = FILTER_RE.captures(expr)?;
        let value = caps.get(2).or_else(|| caps.get(3))?;
        Some(Self {
            field: caps[1].to_string(),
            value: value.as_str().to_string(),
        })
    }

    pub fn matches(&self, document: &Value) -> bool {
        match document.get(&self.field) {
            Some(Value::String(s)) => *s == self.value,
            Some(Value::Bool(b)) => b.to_string() == self.value,
            Some(Value::Number(n)) => n.to_string() == self.value,
            _ => false,
        }
    }
}

fn expand_relation<F>(document: &mut Value, relation: &str, resolve: &F)
where
    F: Fn(&str) -> Option<Value>,
{
    let Some(Value::Array(links)) = document
        .get_mut("Links")
        .and_then(|links| links.get_mut(relation))
    else {
        return;
    };
    for link in links.iter_mut() {
        let target = link
            .get("@odata.id")
            .and_then(Value::as_str)
            .and_then(resolve);
        if let Some(target) = target {
            *link = target;
        }
    }
}

/// Keep only the selected top-level properties plus `@odata.*` annotations.
/// Unknown names are ignored; if none are known the document is unchanged.
fn select_fields(document: &mut Value, select: &[String]) {
    let Value::Object(map) = document else {
        return;
    };
    let known: Vec<&str> = select
        .iter()
        .map(String::as_str)
        .filter(|name| map.contains_key(*name))
        .collect();
    if known.is_empty() {
        return;
    }
    map.retain(|key, _| key.starts_with("@odata.") || known.contains(&key.as_str()));
}
