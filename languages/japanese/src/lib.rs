pub mod kana;
pub mod segment;
pub mod skip;

pub use kana::{fold_kana, is_kana, is_kanji, normalize};
pub use segment::{Segmenter, segment_kana, segment_text};
pub use skip::{SkipCode, SkipError};
