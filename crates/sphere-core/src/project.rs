//! Project descriptors handed over by the data layer.
//!
//! Parsing is tolerant: any field may be missing, `null` or of the wrong
//! type, and an element that is not an object still yields a marker.
//! The only contract with the page is the marker id, `"<category>-<index>"`,
//! which must match the id of the DOM section describing that project.

use crate::error::{Result, SceneError};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Category {
    Music,
    Programming,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Music => "music",
            Category::Programming => "programming",
        }
    }
}

/// Strings pass through; numbers and booleans are rendered; anything else is absent.
fn text_of(v: Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn lenient_text<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<Option<String>, D::Error> {
    Ok(text_of(Value::deserialize(d)?))
}

fn lenient_texts<'de, D: Deserializer<'de>>(
    d: D,
) -> std::result::Result<Option<Vec<String>>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Array(items) => Some(items.into_iter().filter_map(text_of).collect()),
        other => text_of(other).map(|s| vec![s]),
    })
}

fn lenient_links<'de, D: Deserializer<'de>>(
    d: D,
) -> std::result::Result<Option<ProjectLinks>, D::Error> {
    Ok(match Value::deserialize(d)? {
        v @ Value::Object(_) => serde_json::from_value(v).ok(),
        _ => None,
    })
}

#[inline]
pub fn marker_id(category: Category, index: usize) -> String {
    format!("{}-{}", category.as_str(), index)
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ProjectLinks {
    #[serde(deserialize_with = "lenient_text")]
    pub bandcamp: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub spotify: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub youtube: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub github: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub demo: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub website: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub facebook: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub soundcloud: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub instagram: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub maps: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ProjectDescriptor {
    /// Slug from the CMS. Not used for the marker id.
    #[serde(deserialize_with = "lenient_text")]
    pub id: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub title: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub description: Option<String>,
    #[serde(rename = "type", deserialize_with = "lenient_text")]
    pub kind: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub year: Option<String>,
    #[serde(deserialize_with = "lenient_links")]
    pub links: Option<ProjectLinks>,
    #[serde(deserialize_with = "lenient_text")]
    pub github: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub demo: Option<String>,
    #[serde(deserialize_with = "lenient_texts")]
    pub features: Option<Vec<String>>,
    #[serde(deserialize_with = "lenient_texts")]
    pub technologies: Option<Vec<String>>,
    #[serde(deserialize_with = "lenient_texts")]
    pub credits: Option<Vec<String>>,
    #[serde(deserialize_with = "lenient_text")]
    pub color: Option<String>,
}

impl ProjectDescriptor {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }
}

/// A descriptor placed in the combined, ordered project list.
#[derive(Clone, Debug, PartialEq)]
pub struct ProjectEntry {
    pub id: String,
    pub category: Category,
    pub index: usize,
    pub descriptor: ProjectDescriptor,
}

/// Music projects first, then programming projects; ids restart per category.
pub fn combine(music: Vec<ProjectDescriptor>, programming: Vec<ProjectDescriptor>) -> Vec<ProjectEntry> {
    let tag = |category: Category| {
        move |(index, descriptor): (usize, ProjectDescriptor)| ProjectEntry {
            id: marker_id(category, index),
            category,
            index,
            descriptor,
        }
    };
    music
        .into_iter()
        .enumerate()
        .map(tag(Category::Music))
        .chain(programming.into_iter().enumerate().map(tag(Category::Programming)))
        .collect()
}

/// Parse one project list. `null` is an empty list. Only a value that is not
/// an array is an error; every element becomes a descriptor, an unreadable
/// one with no details.
pub fn parse_list(json: &str) -> Result<Vec<ProjectDescriptor>> {
    let list: Option<Vec<Value>> =
        serde_json::from_str(json).map_err(|e| SceneError::InvalidConfig(e.to_string()))?;
    Ok(list
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            serde_json::from_value(item).unwrap_or_else(|e| {
                log::warn!("[field] project {} unreadable ({}); shown without details", i, e);
                ProjectDescriptor::default()
            })
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_restart_per_category() {
        let entries = combine(
            vec![ProjectDescriptor::titled("a"), ProjectDescriptor::titled("b")],
            vec![ProjectDescriptor::titled("c")],
        );
        let ids: Vec<_> = entries.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["music-0", "music-1", "programming-0"]);
        assert_eq!(entries[2].index, 0);
    }

    #[test]
    fn missing_links_and_features_are_tolerated() {
        let list = parse_list(
            r#"[
                { "title": "Tape Loops", "links": { "bandcamp": "https://x.bandcamp.com" } },
                { "title": "Synth", "features": null, "technologies": ["Rust"] },
                { "description": "untitled" }
            ]"#,
        )
        .unwrap();
        assert_eq!(list.len(), 3);
        assert!(list[0].features.is_none());
        assert_eq!(
            list[0].links.as_ref().and_then(|l| l.bandcamp.as_deref()),
            Some("https://x.bandcamp.com")
        );
        assert!(list[1].links.is_none());
        assert!(list[2].title.is_none());
    }

    #[test]
    fn null_list_is_empty() {
        assert!(parse_list("null").unwrap().is_empty());
    }

    #[test]
    fn numeric_year_is_kept_as_text() {
        let list = parse_list(r#"[{"title":"ok"},{"title":"Album","year":2019}]"#).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[1].year.as_deref(), Some("2019"));
        assert_eq!(list[1].title.as_deref(), Some("Album"));
    }

    #[test]
    fn wrong_typed_fields_are_dropped_not_fatal() {
        let list = parse_list(
            r#"[
                { "title": "Clip", "links": { "youtube": ["a"], "github": "https://g" } },
                { "title": "Odd", "links": "none", "features": "solo", "credits": [1, {}, "x"] },
                { "title": { "en": "?" }, "color": 7 }
            ]"#,
        )
        .unwrap();
        assert_eq!(list.len(), 3);
        let links = list[0].links.as_ref().unwrap();
        assert!(links.youtube.is_none());
        assert_eq!(links.github.as_deref(), Some("https://g"));
        assert!(list[1].links.is_none());
        assert_eq!(list[1].features.as_deref(), Some(&["solo".to_string()][..]));
        assert_eq!(list[1].credits.as_deref(), Some(&["1".to_string(), "x".to_string()][..]));
        assert!(list[2].title.is_none());
        assert_eq!(list[2].color.as_deref(), Some("7"));
    }

    #[test]
    fn non_object_element_still_yields_a_marker() {
        let list = parse_list(r#"[42, {"title":"b"}]"#).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0], ProjectDescriptor::default());
        assert_eq!(list[1].title.as_deref(), Some("b"));
    }

    #[test]
    fn non_array_list_is_rejected() {
        assert!(parse_list(r#"{"title":"a"}"#).is_err());
    }
}
