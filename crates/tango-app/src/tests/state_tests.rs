use tango_config::Config;
use tango_db::{AttachError, BuildOptions, JMDICT_DB_VERSION, build_jmdict};
use tempfile::TempDir;

use crate::state::AppState;

const JMDICT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE JMdict [
<!ENTITY n "noun (common) (futsuumeishi)">
]>
<JMdict>
<entry>
<ent_seq>1</ent_seq>
<k_ele><keb>猫</keb></k_ele>
<r_ele><reb>ねこ</reb></r_ele>
<sense><pos>&n;</pos><gloss>cat</gloss></sense>
</entry>
</JMdict>
"#;

fn config(dir: &TempDir) -> Config {
    let mut config = Config::default();
    config.database.user_db = dir.path().join("user.db");
    config.database.dictionary_dir = dir.path().to_path_buf();
    config
}

#[test]
fn test_corrupt_dictionary_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("jmdict.db"),
        b"definitely not an sqlite database, only some text",
    )
    .unwrap();

    let err = AppState::open(config(&dir)).err().unwrap();
    assert!(matches!(
        err.downcast_ref::<AttachError>(),
        Some(AttachError::Corrupt { .. })
    ));
}

#[test]
fn test_wrong_dictionary_version_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("jmdict.db");
    build_jmdict(JMDICT.as_bytes(), &path, &BuildOptions::default()).unwrap();
    rusqlite::Connection::open(&path)
        .unwrap()
        .execute("UPDATE info SET version = ?1", [JMDICT_DB_VERSION + 1])
        .unwrap();

    let err = AppState::open(config(&dir)).err().unwrap();
    assert!(matches!(
        err.downcast_ref::<AttachError>(),
        Some(AttachError::VersionMismatch { found, .. }) if *found == JMDICT_DB_VERSION + 1
    ));
}

#[test]
fn test_valid_dictionary_is_attached() {
    let dir = tempfile::tempdir().unwrap();
    build_jmdict(
        JMDICT.as_bytes(),
        dir.path().join("jmdict.db"),
        &BuildOptions::default(),
    )
    .unwrap();

    let state = AppState::open(config(&dir)).unwrap();
    assert!(state.db.call(|conn| conn.is_attached("jmdict")).unwrap());
}
