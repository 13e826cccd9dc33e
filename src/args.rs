use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};
use log::LevelFilter;

use weave_common::IrOutput;

/// back end for a small concurrent language on multicore embedded targets.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Arguments {
    /// The validated syntax tree, as JSON.
    #[arg(required = true)]
    pub path: PathBuf,

    /// The source text the spans in the syntax tree point into.
    #[arg(long)]
    pub source: Option<PathBuf>,

    /// Print the IR after the given stage. May be repeated.
    #[arg(long, value_enum)]
    pub emit: Vec<Stage>,

    /// Write the allocated program to this file.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// The procedure placed first in the jump table.
    #[arg(long)]
    pub entry: Option<String>,

    /// Log more. Repeat for even more.
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Arguments {
    pub fn stages(&self) -> Vec<IrOutput> {
        self.emit.iter().map(|stage| stage.output()).collect()
    }

    pub fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum Stage {
    Lowered,
    Scheduled,
    Allocated,
    Frames,
}

impl Stage {
    pub fn output(&self) -> IrOutput {
        match self {
            Self::Lowered => IrOutput::Lowered,
            Self::Scheduled => IrOutput::Scheduled,
            Self::Allocated => IrOutput::Allocated,
            Self::Frames => IrOutput::Frames,
        }
    }
}
