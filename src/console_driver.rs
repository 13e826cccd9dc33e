use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};
use codespan_reporting::term::{self, Config, DisplayStyle};
use log::error;

use weave_common::message::Messages;
use weave_common::{Driver, IrOutput};

pub struct ConsoleDriver {
    files: SimpleFiles<String, String>,
    writer: StandardStream,
    config: Config,

    stages: Vec<IrOutput>,
    entry: Option<String>,
    errors: usize,
}

impl ConsoleDriver {
    pub fn new(files: SimpleFiles<String, String>) -> Self {
        Self {
            files,
            writer: StandardStream::stderr(ColorChoice::Auto),
            config: Config {
                display_style: DisplayStyle::Rich,
                ..Default::default()
            },
            stages: Vec::new(),
            entry: None,
            errors: 0,
        }
    }

    pub fn with_stages(self, stages: Vec<IrOutput>) -> Self {
        Self { stages, ..self }
    }

    pub fn with_entry(self, entry: Option<String>) -> Self {
        Self { entry, ..self }
    }

    pub fn errors(&self) -> usize {
        self.errors
    }
}

impl Driver for ConsoleDriver {
    fn report(&mut self, messages: Messages) {
        if messages.has_errors() {
            self.errors += messages.len();
        }

        for msg in messages.msgs {
            if let Err(e) = term::emit(&mut self.writer, &self.config, &self.files, &msg) {
                error!("unable to render diagnostic: {e}");
            }
        }
    }

    fn output_ir(&mut self, at: IrOutput, data: impl FnOnce() -> String) {
        if self.stages.contains(&at) {
            println!("{}", data());
        }
    }

    fn entry_name(&mut self) -> Option<String> {
        self.entry.clone()
    }
}
