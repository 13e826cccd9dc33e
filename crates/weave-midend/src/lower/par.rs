use log::trace;

use weave_common::ast;
use weave_common::ir::StmtNode;
use weave_common::message::Span;
use weave_common::target::MAX_THREADS;

use super::Lowerer;

impl Lowerer {
    /// Run every arm on its own hardware thread. The first arm runs on the
    /// current thread and owns the synchronizer.
    pub(super) fn lower_par(&mut self, at: Span, arms: &[ast::Stmt]) {
        if arms.is_empty() {
            return;
        }

        if arms.len() > MAX_THREADS {
            self.messages
                .at(at)
                .lower_insufficient_threads(arms.len(), MAX_THREADS);
        }

        let sync = self.fresh_temp();
        let thread = self.fresh_temp();
        let space = self.fresh_temp();

        let entries: Vec<_> = arms.iter().map(|_| self.fresh_label()).collect();
        let exit = self.fresh_label();

        trace!("par with {} arms", arms.len());

        self.emit(StmtNode::Fork {
            sync,
            thread,
            space,
            threads: entries.clone(),
        });

        for entry in entries.iter().skip(1) {
            self.emit(StmtNode::ForkSet {
                sync,
                thread,
                space,
                entry: *entry,
            });
        }

        self.emit(StmtNode::ForkSync { sync });

        for (index, (arm, entry)) in arms.iter().zip(entries).enumerate() {
            self.emit(StmtNode::Label(entry));
            self.lower_stmt(arm);
            self.emit(StmtNode::Join {
                sync,
                master: index == 0,
                exit,
            });
        }

        self.emit(StmtNode::Label(exit));
    }
}
