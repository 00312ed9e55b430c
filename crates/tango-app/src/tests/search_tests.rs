use tango_config::Config;
use tango_core::{MatchMode, QuerySpec, TextField};
use tango_db::{BuildOptions, Sets, build_jmdict};
use tango_types::EntryRef;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

use crate::controller::{fetch_page, tree};
use crate::events::Outcome;
use crate::state::AppState;

const JMDICT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE JMdict [
<!ENTITY n "noun (common) (futsuumeishi)">
<!ENTITY arch "archaic">
]>
<JMdict>
<entry>
<ent_seq>1</ent_seq>
<k_ele><keb>猫</keb><ke_pri>nf03</ke_pri></k_ele>
<r_ele><reb>ねこ</reb></r_ele>
<sense><pos>&n;</pos><gloss>cat</gloss></sense>
<sense><misc>&arch;</misc><gloss>geisha</gloss></sense>
</entry>
<entry>
<ent_seq>2</ent_seq>
<k_ele><keb>猫舌</keb></k_ele>
<r_ele><reb>ねこじた</reb></r_ele>
<sense><pos>&n;</pos><gloss>sensitivity to hot food</gloss></sense>
</entry>
<entry>
<ent_seq>3</ent_seq>
<k_ele><keb>子猫</keb><ke_pri>nf20</ke_pri></k_ele>
<r_ele><reb>こねこ</reb></r_ele>
<sense><pos>&n;</pos><gloss>kitten</gloss></sense>
</entry>
</JMdict>
"#;

fn setup() -> (TempDir, AppState) {
    let dir = tempfile::tempdir().unwrap();
    build_jmdict(
        JMDICT.as_bytes(),
        dir.path().join("jmdict.db"),
        &BuildOptions::default(),
    )
    .unwrap();

    let mut config = Config::default();
    config.database.user_db = dir.path().join("user.db");
    config.database.dictionary_dir = dir.path().to_path_buf();
    config.query.results_per_page = 2;
    let state = AppState::open(config).unwrap();
    (dir, state)
}

#[tokio::test(flavor = "multi_thread")]
async fn test_pages_come_with_the_total() {
    let (_dir, state) = setup();
    let spec = QuerySpec::text(TextField::Writing, "猫", MatchMode::Contains);
    let limit = state.page_size(None);

    let first = fetch_page(&state, &spec, 0, limit, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(first.outcome, Outcome::Complete);
    assert_eq!(first.total, Some(3));
    assert_eq!(first.rows, vec![EntryRef::word(1), EntryRef::word(3)]);

    let second = fetch_page(&state, &spec, limit, limit, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(second.rows, vec![EntryRef::word(2)]);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_invalid_search_is_reported() {
    let (_dir, state) = setup();
    let spec = QuerySpec::text(TextField::Reading, "   ", MatchMode::Exact);
    assert!(
        fetch_page(&state, &spec, 0, 10, &CancellationToken::new())
            .await
            .is_err()
    );
}

#[test]
fn test_configured_filter_hides_archaic_senses() {
    let (_dir, state) = setup();
    assert_ne!(state.misc_filter, 0);

    let entry = state.cache.resolve(EntryRef::word(1)).unwrap();
    let word = entry.as_word().unwrap();
    assert_eq!(word.senses.len(), 2);
    assert_eq!(word.relevant_senses(state.misc_filter, 0).count(), 1);
}

#[test]
fn test_missing_dictionaries_are_tolerated() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = Config::default();
    config.database.user_db = dir.path().join("user.db");
    config.database.dictionary_dir = dir.path().join("nowhere");

    let state = AppState::open(config).unwrap();
    assert_eq!(state.misc_filter, 0);
    assert!(state.cache.resolve(EntryRef::word(1)).is_err());
}

#[test]
fn test_set_tree_is_depth_first() {
    let (_dir, state) = setup();
    let spec = QuerySpec::text(TextField::Meaning, "cat", MatchMode::Word);

    let nodes = state
        .db
        .call(move |conn| {
            let mut sets = Sets::new(conn);
            let animals = sets.create_folder(None, "animals")?;
            sets.create_set(Some(animals), "cats", &spec)?;
            sets.create_set(None, "loose", &spec)?;
            tree(&sets)
        })
        .unwrap()
        .unwrap();

    let labels: Vec<(usize, &str)> = nodes
        .iter()
        .map(|(depth, node)| (*depth, node.label.as_str()))
        .collect();
    assert_eq!(labels, vec![(0, "animals"), (1, "cats"), (0, "loose")]);
}
