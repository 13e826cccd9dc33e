use codespan_reporting::diagnostic::Diagnostic;

use super::MessageAdder;

const INSUFFICIENT_THREADS: &str = "EL00";
const MISSING_ENTRY: &str = "EL01";

impl<'a> MessageAdder<'a> {
    pub fn lower_insufficient_threads(&mut self, arms: usize, max: usize) {
        let labels = vec![self
            .primary()
            .with_message(format!("this runs {arms} threads at once"))];
        let notes = vec![
            format!("note: the target provides at most {max} threads to a single `par`"),
            "help: try nesting the parallel arms inside procedures placed `on` other cores".into(),
        ];

        self.add(
            Diagnostic::error()
                .with_code(INSUFFICIENT_THREADS)
                .with_message("insufficient threads")
                .with_labels(labels)
                .with_notes(notes),
        );
    }

    pub fn lower_missing_entry(&mut self, name: &str) {
        let labels = vec![self.primary()];

        self.add(
            Diagnostic::error()
                .with_code(MISSING_ENTRY)
                .with_message(format!("program does not contain a `{name}` procedure"))
                .with_labels(labels),
        );
    }
}
