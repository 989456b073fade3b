//! Bibliographic data model shared by every stage of reconciliation.
//!
//! Every field of a [`Paper`] and an [`Author`] is a list. Absence is an empty
//! list, and merge keeps alternative readings side by side instead of
//! silently picking one. Decoding is lenient: a bare scalar is lifted into a
//! one-element list and `null` becomes an empty list.

use crate::normalize::normalize;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::str::FromStr;

/// Identifier namespaces reported by the citation databases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IdType {
    #[serde(rename = "DOI")]
    Doi,
    #[serde(rename = "ISSN")]
    Issn,
    #[serde(rename = "ISBN")]
    Isbn,
    MicrosoftAcademic,
    OpenCitationsIndex,
    GoogleScholar,
    #[serde(rename = "IEEE")]
    Ieee,
    CrossRef,
    SemanticScholar,
}

/// A tagged identifier such as a DOI or a provider-specific paper id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniqueId {
    #[serde(rename = "type")]
    pub id_type: IdType,
    pub value: String,
}

impl UniqueId {
    pub fn new(id_type: IdType, value: impl Into<String>) -> Self {
        Self {
            id_type,
            value: value.into(),
        }
    }

    pub fn doi(value: impl Into<String>) -> Self {
        Self::new(IdType::Doi, value)
    }

    /// Comparison key: DOIs are case-folded with resolver prefixes removed,
    /// everything else goes through [`normalize`].
    pub fn normalized_value(&self) -> String {
        match self.id_type {
            IdType::Doi => normalize_doi(&self.value),
            _ => normalize(&self.value),
        }
    }
}

/// Case-fold a DOI and strip the `doi:` / resolver URL prefixes.
pub fn normalize_doi(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    let stripped = [
        "https://doi.org/",
        "http://doi.org/",
        "https://dx.doi.org/",
        "http://dx.doi.org/",
        "doi:",
    ]
    .iter()
    .find_map(|prefix| lowered.strip_prefix(*prefix))
    .unwrap_or(&lowered);
    stripped.trim().to_string()
}

/// One identity candidate for a person, as seen by one source
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    /// Database identity of the author row; never merged
    #[serde(default, deserialize_with = "lenient_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "one_or_many", skip_serializing_if = "Vec::is_empty")]
    pub orcid: Vec<String>,
    /// Full display names, e.g. "Jane Doe" or "J. Doe"
    #[serde(default, deserialize_with = "one_or_many", skip_serializing_if = "Vec::is_empty")]
    pub raw_string: Vec<String>,
    #[serde(default, deserialize_with = "one_or_many", skip_serializing_if = "Vec::is_empty")]
    pub first_name: Vec<String>,
    #[serde(default, deserialize_with = "one_or_many", skip_serializing_if = "Vec::is_empty")]
    pub last_name: Vec<String>,
}

impl Author {
    /// Author known only by a display name
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self {
            raw_string: vec![raw.into()],
            ..Default::default()
        }
    }

    /// Author known only by split first/last names
    pub fn from_names(first: impl Into<String>, last: impl Into<String>) -> Self {
        Self {
            first_name: vec![first.into()],
            last_name: vec![last.into()],
            ..Default::default()
        }
    }
}

/// Multi-valued bibliographic description of one work
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paper {
    #[serde(default, deserialize_with = "one_or_many", skip_serializing_if = "Vec::is_empty")]
    pub title: Vec<String>,
    #[serde(
        rename = "abstract",
        default,
        deserialize_with = "one_or_many",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub abstract_text: Vec<String>,
    #[serde(default, deserialize_with = "one_or_many", skip_serializing_if = "Vec::is_empty")]
    pub author: Vec<Author>,
    #[serde(default, deserialize_with = "lenient_numbers", skip_serializing_if = "Vec::is_empty")]
    pub year: Vec<i32>,
    #[serde(default, deserialize_with = "one_or_many", skip_serializing_if = "Vec::is_empty")]
    pub publisher: Vec<String>,
    #[serde(
        rename = "type",
        default,
        deserialize_with = "one_or_many",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub paper_type: Vec<String>,
    #[serde(default, deserialize_with = "one_or_many", skip_serializing_if = "Vec::is_empty")]
    pub scope: Vec<String>,
    #[serde(default, deserialize_with = "one_or_many", skip_serializing_if = "Vec::is_empty")]
    pub scope_name: Vec<String>,
    /// PDF links; merge concatenates these without dedupe
    #[serde(default, deserialize_with = "one_or_many", skip_serializing_if = "Vec::is_empty")]
    pub pdf: Vec<String>,
    #[serde(default, deserialize_with = "one_or_many", skip_serializing_if = "Vec::is_empty")]
    pub unique_id: Vec<UniqueId>,
    #[serde(default, deserialize_with = "lenient_numbers", skip_serializing_if = "Vec::is_empty")]
    pub number_of_citations: Vec<u32>,
    #[serde(default, deserialize_with = "lenient_numbers", skip_serializing_if = "Vec::is_empty")]
    pub number_of_references: Vec<u32>,
    /// Source API tags, e.g. "CrossRef"
    #[serde(default, deserialize_with = "one_or_many", skip_serializing_if = "Vec::is_empty")]
    pub provenance: Vec<String>,
    /// Raw fallback text when a source could not be parsed into fields
    #[serde(default, deserialize_with = "one_or_many", skip_serializing_if = "Vec::is_empty")]
    pub raw: Vec<String>,
}

impl Paper {
    /// Paper with a single title and nothing else
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: vec![title.into()],
            ..Default::default()
        }
    }

    /// Normalized values of every identifier tagged DOI.
    pub fn dois(&self) -> Vec<String> {
        self.unique_id
            .iter()
            .filter(|id| id.id_type == IdType::Doi)
            .map(|id| normalize_doi(&id.value))
            .filter(|doi| !doi.is_empty())
            .collect()
    }

    pub fn lead_title(&self) -> Option<&str> {
        self.title.first().map(String::as_str)
    }

    /// True when at least one title reading is non-blank
    pub fn has_title(&self) -> bool {
        self.title.iter().any(|t| !t.trim().is_empty())
    }
}

/// One provider's answer for one query: the paper plus its citation graph
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceResponse {
    pub paper: Paper,
    /// Papers citing `paper`
    #[serde(default)]
    pub citations: Vec<Paper>,
    /// Papers cited by `paper`
    #[serde(default)]
    pub references: Vec<Paper>,
}

impl SourceResponse {
    pub fn new(paper: Paper) -> Self {
        Self {
            paper,
            citations: Vec::new(),
            references: Vec::new(),
        }
    }
}

impl From<Paper> for SourceResponse {
    fn from(paper: Paper) -> Self {
        Self::new(paper)
    }
}

fn one_or_many<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany<V> {
        Many(Vec<V>),
        One(V),
    }

    Ok(match Option::<OneOrMany<T>>::deserialize(deserializer)? {
        Some(OneOrMany::Many(items)) => items,
        Some(OneOrMany::One(item)) => vec![item],
        None => Vec::new(),
    })
}

/// Numbers may arrive as JSON numbers or numeric strings ("2019").
/// Entries that parse as neither are dropped.
fn lenient_numbers<'de, D, N>(deserializer: D) -> std::result::Result<Vec<N>, D::Error>
where
    D: Deserializer<'de>,
    N: FromStr + DeserializeOwned,
{
    let items = match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items,
        Some(other) => vec![other],
    };

    Ok(items
        .into_iter()
        .filter_map(|item| match item {
            Value::String(s) => s.trim().parse().ok(),
            other => serde_json::from_value(other).ok(),
        })
        .collect())
}

fn lenient_id<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}
