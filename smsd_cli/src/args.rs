use clap::Parser;
use smsd_common::*;

/// Pairwise MCS / substructure comparison of a set of molecules
#[derive(Parser, Debug)]
#[command(name = "smsd")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// SMILES strings to compare; the built-in demo set is used when empty
    pub smiles: Vec<String>,

    /// Search mode
    #[arg(short = 'm', long, value_enum, default_value = "mcs")]
    pub mode: ModeArg,

    /// Maximum number of comparisons running at once (defaults to the number of cores)
    #[arg(short = 't', long)]
    pub threads: Option<usize>,

    /// Side of each match the fragments are cut from
    #[arg(long, value_enum, default_value = "query")]
    pub side: SideArg,

    /// Keep explicit hydrogens instead of stripping them before matching
    #[arg(long, default_value_t = false)]
    pub keep_hydrogens: bool,

    /// Match bonds regardless of their order
    #[arg(long, default_value_t = false)]
    pub ignore_bond_order: bool,

    /// Search-node budget of the backtracking oracle
    #[arg(long, default_value_t = 2_000_000)]
    pub step_limit: u64,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value = "text")]
    pub format: FormatArg,
}

impl Args {
    /// Convert command-line arguments into internal configuration
    pub fn to_config(&self) -> Config {
        Config::builder()
            .mode(self.mode.into())
            .max_concurrency(self.threads.unwrap_or(0))
            .fragment_side(self.side.into())
            .strip_hydrogens(!self.keep_hydrogens)
            .bond_sensitive(!self.ignore_bond_order)
            .build()
    }

    /// The inputs to compare.
    pub fn inputs(&self) -> Vec<String> {
        if self.smiles.is_empty() {
            DEMO_SMILES.iter().map(|s| (*s).to_owned()).collect()
        } else {
            self.smiles.clone()
        }
    }
}

/// Command-line argument wrapper for MatchMode
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum ModeArg {
    /// Maximum common substructure
    #[value(name = "mcs")]
    Mcs,
    /// Whole-query substructure search
    #[value(name = "substructure")]
    Substructure,
}

impl From<ModeArg> for MatchMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Mcs => Self::MaximumCommonSubstructure,
            ModeArg::Substructure => Self::SubstructureSearch,
        }
    }
}

/// Command-line argument wrapper for FragmentSide
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum SideArg {
    /// Cut fragments from the left molecule of each pair
    #[value(name = "query")]
    Query,
    /// Cut fragments from the right molecule of each pair
    #[value(name = "target")]
    Target,
}

impl From<SideArg> for FragmentSide {
    fn from(arg: SideArg) -> Self {
        match arg {
            SideArg::Query => Self::Query,
            SideArg::Target => Self::Target,
        }
    }
}

/// Report layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum FormatArg {
    /// One line per fragment, then a completion marker
    #[value(name = "text")]
    Text,
    /// left,right,status,fragment rows
    #[value(name = "csv")]
    Csv,
    /// Full report with the configuration used
    #[value(name = "json")]
    Json,
}
