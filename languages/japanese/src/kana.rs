use unicode_normalization::UnicodeNormalization;

const KATAKANA_START: u32 = 0x30A1;
const KATAKANA_END: u32 = 0x30F6;
const KATAKANA_TO_HIRAGANA: u32 = 0x60;

/// NFKC-normalize and fold katakana into hiragana.
///
/// This is the form every reading is indexed and queried in, so that
/// `ネコ`, `ﾈｺ` and `ねこ` all compare equal.
pub fn normalize(text: &str) -> String {
    let text: String = text.trim().nfkc().collect();
    fold_kana(&text)
}

/// Fold katakana into hiragana, leaving everything else untouched
pub fn fold_kana(text: &str) -> String {
    text.chars().map(fold_char).collect()
}

fn fold_char(c: char) -> char {
    let code = c as u32;
    match code {
        KATAKANA_START..=KATAKANA_END => {
            char::from_u32(code - KATAKANA_TO_HIRAGANA).unwrap_or(c)
        }
        // iteration marks ヽヾ
        0x30FD | 0x30FE => char::from_u32(code - KATAKANA_TO_HIRAGANA).unwrap_or(c),
        _ => c,
    }
}

pub fn is_kana(c: char) -> bool {
    matches!(c as u32, 0x3041..=0x309F | 0x30A0..=0x30FF | 0xFF66..=0xFF9F)
}

pub fn is_kanji(c: char) -> bool {
    matches!(
        c as u32,
        0x4E00..=0x9FFF | 0x3400..=0x4DBF | 0x20000..=0x2A6DF | 0xF900..=0xFAFF | 0x3005
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn katakana_folds_to_hiragana() {
        assert_eq!(fold_kana("ネコ"), "ねこ");
        assert_eq!(fold_kana("ビョウ"), "びょう");
        assert_eq!(fold_kana("猫ネコcat"), "猫ねこcat");
    }

    #[test]
    fn halfwidth_katakana_normalizes() {
        assert_eq!(normalize("ﾈｺ"), "ねこ");
        assert_eq!(normalize("  ねこ "), "ねこ");
    }

    #[test]
    fn long_vowel_mark_is_kept() {
        assert_eq!(normalize("コーヒー"), "こーひー");
    }

    #[test]
    fn script_classes() {
        assert!(is_kana('ね'));
        assert!(is_kana('ネ'));
        assert!(!is_kana('猫'));
        assert!(is_kanji('猫'));
        assert!(!is_kanji('a'));
    }
}
