use std::io::BufRead;

use crate::tests::fixtures::{self, CAT, NEKOJITA};
use crate::{BuildError, BuildOptions, build_jmdict, build_kanjidic2};

fn open(path: &std::path::Path) -> rusqlite::Connection {
    rusqlite::Connection::open(path).unwrap()
}

#[test]
fn test_build_writes_versioned_dictionaries() {
    let fixture = fixtures::build();

    let jmdict = open(&fixture.jmdict);
    let version: u32 = jmdict
        .query_row("SELECT version FROM info", [], |r| r.get(0))
        .unwrap();
    assert_eq!(version, crate::JMDICT_DB_VERSION);
    let entries: i64 = jmdict
        .query_row("SELECT count(*) FROM entries", [], |r| r.get(0))
        .unwrap();
    assert_eq!(entries, 4);

    let kanjidic2 = open(&fixture.kanjidic2);
    let entries: i64 = kanjidic2
        .query_row("SELECT count(*) FROM entries", [], |r| r.get(0))
        .unwrap();
    assert_eq!(entries, 2);
}

#[test]
fn test_build_reports_entry_count() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("jmdict.db");
    let stats = build_jmdict(
        fixtures::JMDICT.as_bytes(),
        &output,
        &BuildOptions::default(),
    )
    .unwrap();
    assert_eq!(stats.entries, 4);
}

#[test]
fn test_unknown_frequency_is_null() {
    let fixture = fixtures::build();
    let jmdict = open(&fixture.jmdict);
    let rank = |id: u32| -> Option<i64> {
        jmdict
            .query_row("SELECT frequency FROM entries WHERE id = ?1", [id], |r| {
                r.get(0)
            })
            .unwrap()
    };
    assert_eq!(rank(CAT), Some(3));
    assert_eq!(rank(NEKOJITA), None);
}

#[test]
fn test_failed_build_leaves_no_file() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("jmdict.db");
    let truncated = &fixtures::JMDICT.as_bytes()[..fixtures::JMDICT.len() / 2];

    let err = build_jmdict(truncated, &output, &BuildOptions::default()).unwrap_err();
    assert!(matches!(err, BuildError::ParseFailed(_)));
    assert!(!output.exists());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_failed_stroke_pass_leaves_no_file() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("kanjidic2.db");
    let mut strokes = "<kanjivg><kanji id=\"kvg:kanji_04f11\"><g>".as_bytes();

    let err = build_kanjidic2(
        fixtures::KANJIDIC2.as_bytes(),
        Some(&mut strokes as &mut dyn BufRead),
        &output,
        &BuildOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, BuildError::ParseFailed(_)));
    assert!(!output.exists());
}

#[test]
fn test_tag_bits_are_reproducible() {
    let first = fixtures::build();
    let second = fixtures::build();
    let tags = |path: &std::path::Path| -> Vec<(String, i64, String)> {
        open(path)
            .prepare("SELECT category, bit, name FROM tags ORDER BY category, bit")
            .unwrap()
            .query_map([], |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap()
    };

    let tags_first = tags(&first.jmdict);
    assert!(!tags_first.is_empty());
    assert_eq!(tags_first, tags(&second.jmdict));
    assert!(tags_first.contains(&("pos".to_string(), 0, "n".to_string())));
}

#[test]
fn test_tag_descriptions_come_from_entities() {
    let fixture = fixtures::build();
    let description: String = open(&fixture.jmdict)
        .query_row(
            "SELECT description FROM tags WHERE category = 'dial' AND name = 'ksb'",
            [],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(description, "Kansai-ben");
}

#[test]
fn test_root_components_are_flagged() {
    let fixture = fixtures::build();
    let roots: Vec<u32> = open(&fixture.kanjidic2)
        .prepare("SELECT element FROM strokeGroups WHERE kanji = ?1 AND isRoot ORDER BY number")
        .unwrap()
        .query_map(['猫' as u32], |r| r.get(0))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(roots, vec!['犭' as u32, '苗' as u32]);
}

#[test]
fn test_skip_codes_are_split() {
    let fixture = fixtures::build();
    let skip: (i64, i64, i64) = open(&fixture.kanjidic2)
        .query_row(
            "SELECT type, c1, c2 FROM skip WHERE entry = ?1",
            ['休' as u32],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
        )
        .unwrap();
    assert_eq!(skip, (1, 2, 4));
}
