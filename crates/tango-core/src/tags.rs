use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Number of bits available to each tag category
pub const TAG_BITS: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TagCategory {
    PartOfSpeech,
    Misc,
    Field,
    Dialect,
}

impl TagCategory {
    pub const ALL: [TagCategory; 4] = [
        TagCategory::PartOfSpeech,
        TagCategory::Misc,
        TagCategory::Field,
        TagCategory::Dialect,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TagCategory::PartOfSpeech => "pos",
            TagCategory::Misc => "misc",
            TagCategory::Field => "field",
            TagCategory::Dialect => "dial",
        }
    }
}

impl fmt::Display for TagCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TagCategory {
    type Err = TagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TagCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| TagError::UnknownCategory(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TagError {
    #[error("Too many {category} tags: '{name}' does not fit in 64 bits")]
    Overflow { category: TagCategory, name: String },

    #[error("Unknown tag category: {0}")]
    UnknownCategory(String),

    #[error("Tag '{name}' is bound to bit {found}, expected {expected}")]
    Conflict { name: String, expected: u8, found: u8 },
}

/// Dense name -> bit assignment for one tag category.
///
/// Bits are handed out in first-seen order, so the same input always yields
/// the same layout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagBitfield {
    bits: HashMap<String, u8>,
    names: Vec<String>,
}

impl TagBitfield {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bit for `name`, allocating the next free one on first sight
    pub fn register(&mut self, category: TagCategory, name: &str) -> Result<u8, TagError> {
        if let Some(bit) = self.bits.get(name) {
            return Ok(*bit);
        }
        if self.names.len() >= TAG_BITS {
            return Err(TagError::Overflow {
                category,
                name: name.to_string(),
            });
        }
        let bit = self.names.len() as u8;
        self.bits.insert(name.to_string(), bit);
        self.names.push(name.to_string());
        Ok(bit)
    }

    /// Restore a persisted assignment; bits must come back in order
    pub fn restore(&mut self, category: TagCategory, bit: u8, name: &str) -> Result<(), TagError> {
        let assigned = self.register(category, name)?;
        if assigned != bit {
            return Err(TagError::Conflict {
                name: name.to_string(),
                expected: bit,
                found: assigned,
            });
        }
        Ok(())
    }

    pub fn bit_of(&self, name: &str) -> Option<u8> {
        self.bits.get(name).copied()
    }

    pub fn name_of(&self, bit: u8) -> Option<&str> {
        self.names.get(bit as usize).map(String::as_str)
    }

    /// Mask of every known name in `names`; unknown names are ignored
    pub fn mask_of<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> u64 {
        names
            .into_iter()
            .filter_map(|n| self.bit_of(n))
            .fold(0u64, |mask, bit| mask | (1u64 << bit))
    }

    /// Names of the bits set in `mask`, lowest bit first
    pub fn names_in(&self, mask: u64) -> Vec<&str> {
        (0..self.names.len())
            .filter(|bit| mask & (1u64 << bit) != 0)
            .filter_map(|bit| self.name_of(bit as u8))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, &str)> {
        self.names
            .iter()
            .enumerate()
            .map(|(bit, name)| (bit as u8, name.as_str()))
    }
}

/// All tag categories of one dictionary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagRegistry {
    pos: TagBitfield,
    misc: TagBitfield,
    field: TagBitfield,
    dialect: TagBitfield,
    descriptions: HashMap<String, String>,
}

impl TagRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn category(&self, category: TagCategory) -> &TagBitfield {
        match category {
            TagCategory::PartOfSpeech => &self.pos,
            TagCategory::Misc => &self.misc,
            TagCategory::Field => &self.field,
            TagCategory::Dialect => &self.dialect,
        }
    }

    fn category_mut(&mut self, category: TagCategory) -> &mut TagBitfield {
        match category {
            TagCategory::PartOfSpeech => &mut self.pos,
            TagCategory::Misc => &mut self.misc,
            TagCategory::Field => &mut self.field,
            TagCategory::Dialect => &mut self.dialect,
        }
    }

    pub fn register(&mut self, category: TagCategory, name: &str) -> Result<u8, TagError> {
        self.category_mut(category).register(category, name)
    }

    pub fn restore(&mut self, category: TagCategory, bit: u8, name: &str) -> Result<(), TagError> {
        self.category_mut(category).restore(category, bit, name)
    }

    pub fn bit_of(&self, category: TagCategory, name: &str) -> Option<u8> {
        self.category(category).bit_of(name)
    }

    /// Encode a set of tag names, registering the new ones
    pub fn encode<'a>(
        &mut self,
        category: TagCategory,
        names: impl IntoIterator<Item = &'a String>,
    ) -> Result<u64, TagError> {
        let mut mask = 0u64;
        for name in names {
            mask |= 1u64 << self.register(category, name)?;
        }
        Ok(mask)
    }

    pub fn set_description(&mut self, name: &str, description: &str) {
        self.descriptions
            .insert(name.to_string(), description.to_string());
    }

    pub fn description(&self, name: &str) -> Option<&str> {
        self.descriptions.get(name).map(String::as_str)
    }
}
