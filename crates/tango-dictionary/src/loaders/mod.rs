pub mod jmdict;
pub mod kanjidic2;
pub mod kanjivg;
