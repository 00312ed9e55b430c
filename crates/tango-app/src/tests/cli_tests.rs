use clap::Parser;
use tango_core::{MatchMode, QuerySpec, TextField};

use crate::cli::{BuildSource, Cli, Commands, DictionaryArg, SetsAction};

#[test]
fn test_search_defaults() {
    let cli = Cli::try_parse_from(["tango", "search", "ねこ"]).unwrap();
    let Commands::Search { text, filter, page } = cli.command else {
        panic!("expected a search");
    };
    assert_eq!(text, "ねこ");
    assert_eq!(
        filter.spec(&text),
        QuerySpec::text(TextField::Any, "ねこ", MatchMode::Contains)
    );
    assert_eq!(page.offset, 0);
    assert_eq!(page.limit, None);
    assert!(cli.config.is_none());
}

#[test]
fn test_search_flags() {
    let cli = Cli::try_parse_from([
        "tango", "search", "cat", "--field", "meaning", "--mode", "word", "--offset", "50",
        "--limit", "10", "--config", "tango.json",
    ])
    .unwrap();
    let Commands::Search { text, filter, page } = cli.command else {
        panic!("expected a search");
    };
    assert_eq!(
        filter.spec(&text),
        QuerySpec::text(TextField::Meaning, "cat", MatchMode::Word)
    );
    assert_eq!(page.offset, 50);
    assert_eq!(page.limit, Some(10));
    assert_eq!(cli.config.unwrap().to_str(), Some("tango.json"));
}

#[test]
fn test_kanjidic2_build_takes_optional_strokes() {
    let cli = Cli::try_parse_from([
        "tango", "build", "kanjidic2", "kanjidic2.xml", "out.db", "--kanjivg", "kanjivg.xml",
    ])
    .unwrap();
    let Commands::Build {
        source: BuildSource::Kanjidic2 { kanjivg, .. },
    } = cli.command
    else {
        panic!("expected a kanjidic2 build");
    };
    assert!(kanjivg.is_some());
}

#[test]
fn test_sets_subcommands() {
    let cli = Cli::try_parse_from(["tango", "sets", "save", "Cats", "猫", "--parent", "3"]).unwrap();
    let Commands::Sets {
        action: SetsAction::Save { label, parent, .. },
    } = cli.command
    else {
        panic!("expected sets save");
    };
    assert_eq!(label, "Cats");
    assert_eq!(parent, Some(3));

    assert!(Cli::try_parse_from(["tango", "sets", "remove", "not-a-number"]).is_err());
}

#[test]
fn test_entry_ids() {
    assert_eq!(DictionaryArg::Word.parse_id("1000010").unwrap(), 1000010);
    assert_eq!(DictionaryArg::Kanji.parse_id("29483").unwrap(), 29483);
    assert_eq!(DictionaryArg::Kanji.parse_id("猫").unwrap(), 0x732B);
    assert!(DictionaryArg::Word.parse_id("猫").is_err());
    assert!(DictionaryArg::Kanji.parse_id("猫舌").is_err());
}
