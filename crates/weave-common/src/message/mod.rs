mod source;

mod lower;

pub use source::{File, Span};

use codespan_reporting::diagnostic::{Diagnostic, Severity};

#[derive(Debug, Default)]
pub struct Messages {
    pub msgs: Vec<Diagnostic<File>>,
}

impl Messages {
    pub fn new() -> Self {
        Self { msgs: Vec::new() }
    }

    #[must_use]
    pub fn at(&mut self, span: Span) -> MessageAdder {
        MessageAdder {
            msgs: self,
            at: span,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.msgs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.msgs.len()
    }

    pub fn has_errors(&self) -> bool {
        self.msgs
            .iter()
            .any(|msg| msg.severity >= Severity::Error)
    }

    pub fn merge(&mut self, other: Messages) {
        self.msgs.extend(other.msgs);
    }
}

#[derive(Debug)]
pub struct MessageAdder<'a> {
    msgs: &'a mut Messages,
    at: Span,
}

impl<'a> MessageAdder<'a> {
    fn add(&mut self, diag: Diagnostic<File>) {
        self.msgs.msgs.push(diag);
    }

    fn primary(&self) -> codespan_reporting::diagnostic::Label<File> {
        codespan_reporting::diagnostic::Label::primary(self.at.file, self.at)
    }
}
