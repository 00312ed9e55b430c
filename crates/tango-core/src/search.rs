use serde::{Deserialize, Serialize};
use tango_types::DictionaryId;

use crate::tags::TagCategory;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextField {
    Writing,
    Reading,
    Meaning,
    /// Writing, reading or meaning
    Any,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchMode {
    /// Whole field equals the pattern
    Exact,
    /// Field starts with the pattern
    Prefix,
    /// Pattern appears anywhere in the field
    Contains,
    /// Pattern matches whole words (meanings) or runs (readings)
    Word,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NumericField {
    StrokeCount,
    Grade,
    Frequency,
    Jlpt,
}

impl NumericField {
    /// Accepted bounds for this field
    pub fn bounds(self) -> (i64, i64) {
        match self {
            NumericField::StrokeCount => (1, 84),
            NumericField::Grade => (1, 10),
            NumericField::Frequency => (1, i64::from(u16::MAX)),
            NumericField::Jlpt => (1, 5),
        }
    }
}

/// One filter of a search; all clauses of a spec must hold
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Clause {
    Text {
        field: TextField,
        pattern: String,
        mode: MatchMode,
    },
    Tag {
        category: TagCategory,
        name: String,
    },
    Range {
        field: NumericField,
        min: Option<i64>,
        max: Option<i64>,
    },
    /// Kanji built from every listed component
    Components { elements: Vec<char> },
    /// Kanji with this SKIP code
    Skip { code: String },
    /// Restrict the search to one dictionary
    Dictionary { id: DictionaryId },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Order {
    /// Most common first, entries without a rank last
    #[default]
    Frequency,
    Identifier,
}

/// Parsed representation of a search request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuerySpec {
    pub clauses: Vec<Clause>,
    #[serde(default)]
    pub order: Order,
}

impl QuerySpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, clause: Clause) -> Self {
        self.clauses.push(clause);
        self
    }

    pub fn ordered_by(mut self, order: Order) -> Self {
        self.order = order;
        self
    }

    /// Shorthand for a text clause
    pub fn text(field: TextField, pattern: impl Into<String>, mode: MatchMode) -> Self {
        Self::new().with(Clause::Text {
            field,
            pattern: pattern.into(),
            mode,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_survives_json() {
        let spec = QuerySpec::text(TextField::Meaning, "cat", MatchMode::Contains)
            .with(Clause::Tag {
                category: TagCategory::PartOfSpeech,
                name: "n".into(),
            })
            .with(Clause::Range {
                field: NumericField::StrokeCount,
                min: Some(3),
                max: None,
            })
            .ordered_by(Order::Identifier);
        let json = serde_json::to_string(&spec).unwrap();
        let back: QuerySpec = serde_json::from_str(&json).unwrap();
        assert_eq!(back, spec);
    }

    #[test]
    fn order_defaults_to_frequency() {
        let spec: QuerySpec = serde_json::from_str(r#"{ "clauses": [] }"#).unwrap();
        assert_eq!(spec.order, Order::Frequency);
    }
}
