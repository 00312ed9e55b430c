use crate::{Kanjidic2Parser, ParseError, ParsedKanji};

const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<kanjidic2>
<header><file_version>4</file_version></header>
<character>
<literal>猫</literal>
<codepoint><cp_value cp_type="ucs">732b</cp_value></codepoint>
<misc>
<grade>8</grade>
<stroke_count>11</stroke_count>
<stroke_count>12</stroke_count>
<freq>1702</freq>
<jlpt>2</jlpt>
</misc>
<query_code>
<q_code qc_type="skip" skip_misclass="posn">1-3-7</q_code>
<q_code qc_type="skip">1-3-8</q_code>
<q_code qc_type="four_corner">4426.0</q_code>
</query_code>
<reading_meaning>
<rmgroup>
<reading r_type="pinyin">mao1</reading>
<reading r_type="ja_on">ビョウ</reading>
<reading r_type="ja_kun">ねこ</reading>
<meaning>cat</meaning>
<meaning m_lang="fr">chat</meaning>
</rmgroup>
<nanori>ね</nanori>
</reading_meaning>
</character>
<character>
<literal>丶</literal>
<misc><stroke_count>1</stroke_count></misc>
</character>
</kanjidic2>
"#;

fn parse_all(languages: &[&str]) -> Vec<ParsedKanji> {
    let mut parser = Kanjidic2Parser::new(languages.iter().map(|l| l.to_string()).collect());
    let mut out = Vec::new();
    parser
        .parse(SAMPLE.as_bytes(), |k| {
            out.push(k);
            true
        })
        .expect("parse failed");
    out
}

#[test]
fn test_character_fields() {
    let kanji = parse_all(&["en"]);
    assert_eq!(kanji.len(), 2);

    let cat = &kanji[0];
    assert_eq!(cat.literal, '猫');
    assert_eq!(cat.grade, Some(8));
    assert_eq!(cat.stroke_count, Some(11));
    assert_eq!(cat.frequency, Some(1702));
    assert_eq!(cat.jlpt, Some(2));
    assert_eq!(cat.skip.as_deref(), Some("1-3-8"));
    assert_eq!(cat.four_corner.as_deref(), Some("4426.0"));
    assert_eq!(cat.nanori, vec!["ね"]);
    assert_eq!(
        cat.readings,
        vec![
            ("pinyin".to_string(), "mao1".to_string()),
            ("ja_on".to_string(), "ビョウ".to_string()),
            ("ja_kun".to_string(), "ねこ".to_string()),
        ]
    );
    assert_eq!(cat.meanings, vec![("en".to_string(), "cat".to_string())]);
}

#[test]
fn test_missing_values_stay_unknown() {
    let kanji = parse_all(&["en"]);
    let dot = &kanji[1];
    assert_eq!(dot.stroke_count, Some(1));
    assert_eq!(dot.grade, None);
    assert_eq!(dot.frequency, None);
    assert_eq!(dot.jlpt, None);
    assert_eq!(dot.skip, None);
    assert!(dot.meanings.is_empty());
}

#[test]
fn test_meaning_language_filter() {
    let kanji = parse_all(&["fr"]);
    assert_eq!(kanji[0].meanings, vec![("fr".to_string(), "chat".to_string())]);
}

#[test]
fn test_missing_root_is_malformed() {
    let mut parser = Kanjidic2Parser::new(vec!["en".to_string()]);
    let result = parser.parse("<other/>".as_bytes(), |_| true);
    assert!(matches!(result, Err(ParseError::MalformedInput { .. })));
}
