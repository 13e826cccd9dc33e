mod args;
mod console_driver;


use std::fs;

use anyhow::{bail, Context};
use clap::Parser;
use codespan_reporting::files::SimpleFiles;
use log::info;

use weave_common::ast;

use args::Arguments;
use console_driver::ConsoleDriver;

fn main() -> anyhow::Result<()> {
    let args = Arguments::parse();

    env_logger::Builder::new()
        .filter_level(args.log_level())
        .parse_default_env()
        .init();

    let text = fs::read_to_string(&args.path)
        .with_context(|| format!("unable to read `{}`", args.path.display()))?;
    let tree: ast::Program = serde_json::from_str(&text)
        .with_context(|| format!("`{}` is not a valid syntax tree", args.path.display()))?;

    // Spans point into the source file when there is one.
    let mut files = SimpleFiles::new();
    match &args.source {
        Some(path) => {
            let source = fs::read_to_string(path)
                .with_context(|| format!("unable to read `{}`", path.display()))?;
            files.add(path.display().to_string(), source);
        }

        None => {
            files.add(args.path.display().to_string(), String::new());
        }
    }

    let mut driver = ConsoleDriver::new(files)
        .with_stages(args.stages())
        .with_entry(args.entry.clone());

    let Some(mut program) = weave_midend::build(&mut driver, &tree) else {
        bail!("aborting after {} error(s)", driver.errors());
    };

    weave_backend::compile(&mut driver, &mut program);

    if let Some(path) = &args.output {
        fs::write(path, program.pretty(true))
            .with_context(|| format!("unable to write `{}`", path.display()))?;
        info!("wrote {}", path.display());
    }

    Ok(())
}
