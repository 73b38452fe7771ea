//! Query utilities for the Infoblox WAPI
//!
//! Provides search conditions, read options and the paged search envelope.

use crate::error::InfobloxError;
use serde::Deserialize;
use std::collections::HashSet;

/// Single field-equality search predicate
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Condition {
    pub field: String,
    pub value: String,
}

impl Condition {
    /// Match objects whose `field` equals `value`
    pub fn new(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// Read options passed through to WAPI as underscore-prefixed parameters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    /// Fields to return (`_return_fields`)
    pub return_fields: Vec<String>,
    /// Return the object's basic fields in addition to `return_fields`
    /// (`_return_fields+`)
    pub base: bool,
    /// Cap on result count (`_max_results`)
    pub max_results: Option<u32>,
}

impl Options {
    /// Options selecting the given fields
    pub fn with_return_fields<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            return_fields: fields.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Also return the basic fields
    pub fn base(mut self, base: bool) -> Self {
        self.base = base;
        self
    }

    /// Cap the number of results
    pub fn max_results(mut self, max_results: u32) -> Self {
        self.max_results = Some(max_results);
        self
    }

    /// Encode as query parameters
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        if !self.return_fields.is_empty() {
            let key = if self.base { "_return_fields+" } else { "_return_fields" };
            query.push((key.to_string(), self.return_fields.join(",")));
        }
        if let Some(max) = self.max_results {
            query.push(("_max_results".to_string(), max.to_string()));
        }
        query
    }
}

/// Build the query for a search: conditions first, then options
///
/// Field names must be unique within one search.
pub fn build_query(conditions: &[Condition], options: &Options) -> Result<Vec<(String, String)>, InfobloxError> {
    let mut seen = HashSet::new();
    let mut query = Vec::with_capacity(conditions.len() + 2);

    for condition in conditions {
        if condition.field.is_empty() {
            return Err(InfobloxError::InvalidRequest("search field name is empty".to_string()));
        }
        if condition.field.starts_with('_') {
            return Err(InfobloxError::InvalidRequest(format!(
                "search field {:?} clashes with a reserved WAPI argument",
                condition.field
            )));
        }
        if !seen.insert(condition.field.as_str()) {
            return Err(InfobloxError::InvalidRequest(format!(
                "search field {:?} given more than once",
                condition.field
            )));
        }
        query.push((condition.field.clone(), condition.value.clone()));
    }

    query.extend(options.to_query());
    Ok(query)
}

/// Paged search envelope (`_return_as_object=1`)
#[derive(Debug, Clone, Deserialize)]
pub struct PagedResponse<T> {
    pub result: Vec<T>,
    #[serde(default)]
    pub next_page_id: Option<String>,
}
