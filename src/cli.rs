// SPDX-License-Identifier: BSD-3-Clause
use std::fmt;
use std::path::PathBuf;

use andersen::Discipline;

#[derive(Clone, Debug, Eq, PartialEq, clap::ValueEnum)]
pub enum Worklist {
    Fifo,
    Lifo,
}

impl std::fmt::Display for Worklist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Worklist::Fifo => write!(f, "fifo"),
            Worklist::Lifo => write!(f, "lifo"),
        }
    }
}

impl From<Worklist> for Discipline {
    fn from(w: Worklist) -> Self {
        match w {
            Worklist::Fifo => Discipline::Fifo,
            Worklist::Lifo => Discipline::Lifo,
        }
    }
}

/// Andersen-style points-to analysis of a constraint graph
#[derive(Debug, clap::Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Accept a result cut short by --max-steps
    #[arg(long)]
    pub allow_partial: bool,

    /// Cross-check the result against the Datalog reference solver
    #[arg(long)]
    pub check: bool,

    /// Constraint graph (JSON)
    #[arg()]
    pub graph: PathBuf,

    /// Print points-to sets as JSON
    #[arg(long)]
    pub json: bool,

    /// Stop after this many worklist steps
    #[arg(long)]
    pub max_steps: Option<usize>,

    /// Report solver metrics
    #[arg(long)]
    pub metrics: bool,

    /// Quiet
    #[arg(long)]
    pub quiet: bool,

    /// Tracing
    #[arg(long)]
    pub tracing: bool,

    /// Worklist discipline
    #[arg(long, default_value_t = Worklist::Fifo)]
    pub worklist: Worklist,
}
