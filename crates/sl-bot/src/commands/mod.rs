pub mod check;
pub mod play;
pub mod serve;

use std::path::{Path, PathBuf};

use clap::{Args, ValueEnum};
use sl_core::{
    Catalog, CatalogOptions, DuplicatePolicy, GameConfig, Lexicon, ResubmitPolicy,
    SelectionPolicy, SessionRegistry, SlError,
};

/// Game data and rules shared by `serve` and `play`.
#[derive(Args, Debug, Clone)]
pub struct GameArgs {
    /// Word/image catalog, one `word<TAB>image` pair per line
    #[arg(short, long)]
    pub catalog: PathBuf,

    /// Word list of acceptable guesses, one per line
    #[arg(short, long)]
    pub words: Option<PathBuf>,

    /// Agreed guesses per game
    #[arg(short, long, default_value = "5")]
    pub attempts: u32,

    /// Puzzles each pair plays before the room closes
    #[arg(long, default_value = "3")]
    pub puzzles: u32,

    /// How each game picks its word
    #[arg(long, value_enum, default_value = "random")]
    pub selection: SelectionArg,

    /// Seed for random word selection
    #[arg(long)]
    pub seed: Option<u64>,

    #[command(flatten)]
    pub load: LoadArgs,

    /// What to do when a player guesses again before the partner answers
    #[arg(long, value_enum, default_value = "overwrite")]
    pub resubmit: ResubmitArg,
}

/// Catalog parsing options.
#[derive(Args, Debug, Clone)]
pub struct LoadArgs {
    /// What to do with a word listed twice in the catalog
    #[arg(long, value_enum, default_value = "reject")]
    pub duplicates: DuplicatesArg,

    /// Require every catalog word to have this many letters
    #[arg(long)]
    pub word_length: Option<usize>,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum SelectionArg {
    Random,
    Sequential,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum DuplicatesArg {
    Reject,
    LastWins,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum ResubmitArg {
    Overwrite,
    Reject,
}

impl From<SelectionArg> for SelectionPolicy {
    fn from(arg: SelectionArg) -> Self {
        match arg {
            SelectionArg::Random => SelectionPolicy::Random,
            SelectionArg::Sequential => SelectionPolicy::Sequential,
        }
    }
}

impl From<DuplicatesArg> for DuplicatePolicy {
    fn from(arg: DuplicatesArg) -> Self {
        match arg {
            DuplicatesArg::Reject => DuplicatePolicy::Reject,
            DuplicatesArg::LastWins => DuplicatePolicy::LastWins,
        }
    }
}

impl From<ResubmitArg> for ResubmitPolicy {
    fn from(arg: ResubmitArg) -> Self {
        match arg {
            ResubmitArg::Overwrite => ResubmitPolicy::Overwrite,
            ResubmitArg::Reject => ResubmitPolicy::Reject,
        }
    }
}

impl LoadArgs {
    fn options(&self) -> CatalogOptions {
        let options = CatalogOptions::default().with_duplicates(self.duplicates.into());
        match self.word_length {
            Some(len) => options.with_word_length(len),
            None => options,
        }
    }
}

impl GameArgs {
    fn config(&self) -> GameConfig {
        let config = GameConfig::default()
            .with_attempt_limit(self.attempts)
            .with_selection(self.selection.into())
            .with_resubmit(self.resubmit.into())
            .with_puzzles(self.puzzles);
        match self.seed {
            Some(seed) => config.with_seed(seed),
            None => config,
        }
    }
}

/// Load a catalog, mapping errors to CLI messages. An empty catalog is an
/// error since no game could ever start.
fn load_catalog(path: &Path, load: &LoadArgs) -> Result<Catalog, String> {
    let catalog =
        Catalog::load(path, &load.options()).map_err(|e| format!("{}: {e}", path.display()))?;
    if catalog.is_empty() {
        return Err(format!("{}: {}", path.display(), SlError::EmptyCatalog));
    }
    Ok(catalog)
}

/// Load the game data and build a registry.
fn build_registry(args: &GameArgs) -> Result<SessionRegistry, String> {
    let catalog = load_catalog(&args.catalog, &args.load)?;
    let registry = SessionRegistry::new(args.config(), catalog);

    match &args.words {
        Some(path) => {
            let lexicon = Lexicon::load(path).map_err(|e| format!("{}: {e}", path.display()))?;
            Ok(registry.with_lexicon(lexicon))
        }
        None => Ok(registry),
    }
}
