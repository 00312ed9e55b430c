pub mod error;
pub mod loaders;
pub mod types;
mod xml;

#[cfg(test)]
mod tests;

pub use error::ParseError;
pub use loaders::jmdict::JmdictParser;
pub use loaders::kanjidic2::Kanjidic2Parser;
pub use loaders::kanjivg::KanjiVgParser;
pub use types::{
    ParsedGroup, ParsedKanji, ParsedReading, ParsedSense, ParsedStroke, ParsedStrokes,
    ParsedWord, ParsedWriting,
};
