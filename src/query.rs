//! Ticket search expressions.
//!
//! A query is a whitespace-separated list of sentences. A sentence is either a
//! bare word, read as `title:<word>`, or `key:value1,value2`:
//!
//! ```rust
//! use ticketdesk::query::{parse, TagKey};
//!
//! let tags = parse("label:bug,request crash").unwrap();
//! assert_eq!(tags[0].key, TagKey::Label);
//! assert_eq!(tags[0].values, ["bug", "request"]);
//! assert_eq!(tags[1].key, TagKey::Title);
//! assert_eq!(tags[1].values, ["crash"]);
//! ```
//!
//! Sentences combine with AND. Within a `label` sentence the values are OR'd.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagKey {
    /// Case-insensitive substring of the ticket title.
    Title,
    /// Exact label name.
    Label,
}

impl TagKey {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Label => "label",
        }
    }
}

impl fmt::Display for TagKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TagKey {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "title" => Ok(Self::Title),
            "label" => Ok(Self::Label),
            other => Err(QueryError::UnknownKey(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagPredicate {
    pub key: TagKey,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("unknown search key '{0}'")]
    UnknownKey(String),

    #[error("malformed search term '{0}'")]
    Malformed(String),
}

impl QueryError {
    /// The key (or term) the caller got wrong.
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::UnknownKey(key) | Self::Malformed(key) => key,
        }
    }
}

/// Parses a search expression. Empty input yields no predicates.
///
/// Empty values (`label:` or `label:a,,b`) are dropped, and a sentence left
/// without values contributes no predicate.
pub fn parse(input: &str) -> Result<Vec<TagPredicate>, QueryError> {
    let mut predicates = Vec::new();

    for sentence in input.split_whitespace() {
        let (key, raw_values) = match sentence.split_once(':') {
            None => (TagKey::Title, sentence),
            Some((_, rest)) if rest.contains(':') => {
                return Err(QueryError::Malformed(sentence.to_string()));
            }
            Some((key, rest)) => (key.parse()?, rest),
        };

        let values: Vec<String> = raw_values
            .split(',')
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .collect();

        if !values.is_empty() {
            predicates.push(TagPredicate { key, values });
        }
    }

    Ok(predicates)
}
