use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tango_core::{MatchMode, QuerySpec, TextField};
use tango_types::DictionaryId;

#[derive(Parser)]
#[command(name = "tango", about = "Japanese dictionary engine", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to a JSON config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build a dictionary database from its XML source
    Build {
        #[command(subcommand)]
        source: BuildSource,
    },

    /// Search the attached dictionaries
    Search {
        /// Text to look for
        text: String,

        #[command(flatten)]
        filter: TextFilter,

        #[command(flatten)]
        page: Page,
    },

    /// Print one entry
    Show {
        #[arg(value_enum)]
        dictionary: DictionaryArg,

        /// Entry id; kanji also accept the character itself
        id: String,
    },

    /// Manage saved searches
    Sets {
        #[command(subcommand)]
        action: SetsAction,
    },
}

#[derive(Subcommand)]
pub enum BuildSource {
    /// JMdict word dictionary
    Jmdict {
        /// JMdict XML file
        source: PathBuf,
        /// Database file to write
        output: PathBuf,
    },

    /// KANJIDIC2 kanji dictionary
    Kanjidic2 {
        /// KANJIDIC2 XML file
        source: PathBuf,
        /// KanjiVG XML file with stroke data
        #[arg(long)]
        kanjivg: Option<PathBuf>,
        /// Database file to write
        output: PathBuf,
    },
}

#[derive(Subcommand)]
pub enum SetsAction {
    /// Print the folder tree
    List,

    /// Save a search
    Save {
        label: String,
        text: String,

        #[command(flatten)]
        filter: TextFilter,

        /// Folder to save into
        #[arg(long)]
        parent: Option<i64>,
    },

    /// Create a folder
    Folder {
        label: String,

        #[arg(long)]
        parent: Option<i64>,
    },

    /// Run a saved search
    Run {
        id: i64,

        #[command(flatten)]
        page: Page,
    },

    /// Rename a folder or saved search
    Rename { id: i64, label: String },

    /// Remove a saved search, or a folder with everything in it
    Remove { id: i64 },
}

#[derive(clap::Args, Clone, Copy)]
pub struct TextFilter {
    /// Field to match against
    #[arg(long, value_enum, default_value_t = FieldArg::Any)]
    pub field: FieldArg,

    /// How the text must match
    #[arg(long, value_enum, default_value_t = ModeArg::Contains)]
    pub mode: ModeArg,
}

impl TextFilter {
    pub fn spec(&self, text: &str) -> QuerySpec {
        QuerySpec::text(self.field.into(), text, self.mode.into())
    }
}

#[derive(clap::Args, Clone, Copy)]
pub struct Page {
    #[arg(long, default_value_t = 0)]
    pub offset: u64,

    /// Results per page, defaults to the configured page size
    #[arg(long)]
    pub limit: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FieldArg {
    Writing,
    Reading,
    Meaning,
    Any,
}

impl From<FieldArg> for TextField {
    fn from(field: FieldArg) -> Self {
        match field {
            FieldArg::Writing => TextField::Writing,
            FieldArg::Reading => TextField::Reading,
            FieldArg::Meaning => TextField::Meaning,
            FieldArg::Any => TextField::Any,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Exact,
    Prefix,
    Contains,
    Word,
}

impl From<ModeArg> for MatchMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Exact => MatchMode::Exact,
            ModeArg::Prefix => MatchMode::Prefix,
            ModeArg::Contains => MatchMode::Contains,
            ModeArg::Word => MatchMode::Word,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DictionaryArg {
    Word,
    Kanji,
}

impl DictionaryArg {
    pub fn id(self) -> DictionaryId {
        match self {
            DictionaryArg::Word => DictionaryId::Words,
            DictionaryArg::Kanji => DictionaryId::Kanji,
        }
    }

    /// Entry id from the command line. Kanji may be given as the
    /// character itself instead of its code point.
    pub fn parse_id(self, id: &str) -> anyhow::Result<u32> {
        if let Ok(number) = id.trim().parse::<u32>() {
            return Ok(number);
        }
        let mut chars = id.trim().chars();
        match (self, chars.next(), chars.next()) {
            (DictionaryArg::Kanji, Some(c), None) => Ok(u32::from(c)),
            _ => anyhow::bail!("{id:?} is not a valid {self:?} id"),
        }
    }
}
