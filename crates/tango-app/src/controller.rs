use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::sync::Arc;

use tango_config::Config;
use tango_core::QuerySpec;
use tango_db::{
    BuildOptions, BuildStats, QueryEngine, SetNode, Sets, SetsError, build_jmdict,
    build_kanjidic2,
};
use tokio_util::sync::CancellationToken;

use crate::cli::{BuildSource, Commands, Page, SetsAction};
use crate::events::{Outcome, SearchPage, collect_page};
use crate::print::describe;
use crate::state::AppState;

/// Application controller for command dispatch and lifecycle
pub struct AppController {
    config: Config,
    cancel_token: CancellationToken,
}

impl AppController {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            cancel_token: CancellationToken::new(),
        }
    }

    pub async fn run(&self, command: Commands) -> anyhow::Result<()> {
        match command {
            Commands::Build { source } => self.build(source).await,
            Commands::Search { text, filter, page } => {
                let state = self.open_state().await?;
                self.search(&state, &filter.spec(&text), page).await
            }
            Commands::Show { dictionary, id } => {
                let id = dictionary.parse_id(&id)?;
                let state = self.open_state().await?;
                let entry = tokio::task::block_in_place(|| state.cache.get(dictionary.id(), id))?;
                println!("{}", describe(&entry, state.misc_filter));
                Ok(())
            }
            Commands::Sets { action } => {
                let state = self.open_state().await?;
                self.sets(&state, action).await
            }
        }
    }

    pub fn shutdown(&self) {
        self.cancel_token.cancel();
    }

    async fn open_state(&self) -> anyhow::Result<Arc<AppState>> {
        let config = self.config.clone();
        let state = tokio::task::spawn_blocking(move || AppState::open(config)).await??;
        Ok(Arc::new(state))
    }

    /// Builds run to completion once started; the output only appears if
    /// the whole build succeeds.
    async fn build(&self, source: BuildSource) -> anyhow::Result<()> {
        let options = BuildOptions {
            languages: self.config.dictionary.languages.clone(),
        };

        let stats: BuildStats = tokio::task::spawn_blocking(move || -> anyhow::Result<_> {
            match source {
                BuildSource::Jmdict { source, output } => {
                    Ok(build_jmdict(open_xml(source)?, output, &options)?)
                }
                BuildSource::Kanjidic2 {
                    source,
                    kanjivg,
                    output,
                } => {
                    let mut strokes = kanjivg.map(open_xml).transpose()?;
                    let strokes = strokes
                        .as_mut()
                        .map(|reader| reader as &mut dyn std::io::BufRead);
                    Ok(build_kanjidic2(open_xml(source)?, strokes, output, &options)?)
                }
            }
        })
        .await??;

        println!("{} entries in {:.1?}", stats.entries, stats.elapsed);
        Ok(())
    }

    async fn search(&self, state: &AppState, spec: &QuerySpec, page: Page) -> anyhow::Result<()> {
        let limit = state.page_size(page.limit);
        let result = fetch_page(state, spec, page.offset, limit, &self.cancel_token).await?;

        match result.outcome {
            Outcome::Complete => {}
            Outcome::Aborted => tracing::warn!("search was aborted"),
            Outcome::Cancelled => return Ok(()),
        }

        tokio::task::block_in_place(|| {
            for entry in &result.rows {
                match state.cache.resolve(*entry) {
                    Ok(loaded) => println!("{}\n", describe(&loaded, state.misc_filter)),
                    Err(e) => tracing::error!("failed to load {entry}: {e}"),
                }
            }
        });

        let shown = result.rows.len() as u64;
        match result.total {
            Some(total) if shown > 0 => println!(
                "{}-{} of {total}",
                page.offset + 1,
                page.offset + shown
            ),
            Some(total) => println!("0 of {total}"),
            None => println!("{shown} results"),
        }
        Ok(())
    }

    async fn sets(&self, state: &AppState, action: SetsAction) -> anyhow::Result<()> {
        match action {
            SetsAction::List => {
                let tree = state.db.call_async(|conn| tree(&Sets::new(conn))).await??;
                for (depth, node) in tree {
                    println!("{}{} [{}]", "  ".repeat(depth), node.label, node.id);
                }
            }
            SetsAction::Save {
                label,
                text,
                filter,
                parent,
            } => {
                let spec = filter.spec(&text);
                let id = state
                    .db
                    .call_async(move |conn| Sets::new(conn).create_set(parent, &label, &spec))
                    .await??;
                println!("saved search {id}");
            }
            SetsAction::Folder { label, parent } => {
                let id = state
                    .db
                    .call_async(move |conn| Sets::new(conn).create_folder(parent, &label))
                    .await??;
                println!("created folder {id}");
            }
            SetsAction::Run { id, page } => {
                let spec = state
                    .db
                    .call_async(move |conn| Sets::new(conn).load(id))
                    .await??;
                self.search(state, &spec, page).await?;
            }
            SetsAction::Rename { id, label } => {
                state
                    .db
                    .call_async(move |conn| Sets::new(conn).rename(id, &label))
                    .await??;
            }
            SetsAction::Remove { id } => {
                let removed = state
                    .db
                    .call_async(move |conn| Sets::new(conn).remove(id))
                    .await??;
                println!("removed {removed} nodes");
            }
        }
        Ok(())
    }
}

/// Prepares `spec`, queues its count and one page of rows, and waits for the
/// page. On shutdown the fetch is aborted before returning.
pub async fn fetch_page(
    state: &AppState,
    spec: &QuerySpec,
    offset: u64,
    limit: u64,
    cancel: &CancellationToken,
) -> anyhow::Result<SearchPage> {
    let (mut engine, receiver) = QueryEngine::new(state.db.clone());
    let receiver = receiver.to_async();

    tokio::task::block_in_place(|| -> anyhow::Result<()> {
        engine.prepare(spec)?;
        engine.fetch_count()?;
        engine.fetch(offset, limit)?;
        Ok(())
    })?;

    let page = collect_page(&receiver, cancel).await?;
    if page.outcome == Outcome::Cancelled {
        tokio::task::block_in_place(|| engine.abort());
    }
    Ok(page)
}

/// Folder tree in display order, with nesting depth
pub fn tree(sets: &Sets<'_>) -> Result<Vec<(usize, SetNode)>, SetsError> {
    let mut out = Vec::new();
    let mut pending: Vec<(usize, SetNode)> = sets
        .children(None)?
        .into_iter()
        .rev()
        .map(|node| (0, node))
        .collect();
    while let Some((depth, node)) = pending.pop() {
        let children = sets.children(Some(node.id))?;
        pending.extend(children.into_iter().rev().map(|child| (depth + 1, child)));
        out.push((depth, node));
    }
    Ok(out)
}

fn open_xml(path: PathBuf) -> anyhow::Result<BufReader<File>> {
    let file = File::open(&path)
        .map_err(|e| anyhow::anyhow!("cannot open {}: {e}", path.display()))?;
    Ok(BufReader::new(file))
}
