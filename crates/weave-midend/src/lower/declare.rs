use log::trace;

use weave_common::ast;
use weave_common::frame::Frame;
use weave_common::ir::Procedure;

use super::Lowerer;

impl Lowerer {
    /// Lay out the data pool and create a procedure with a frame for every
    /// declaration. Returns the indices of the declarations in procedure
    /// order, with the entry procedure first.
    pub(super) fn declare(&mut self, ast: &ast::Program, entry: &str) -> Vec<usize> {
        for global in ast.globals.iter() {
            let label = self.program.labels.fresh();
            let slot = self.program.data.add(&global.name, global.kind.size(), label);
            trace!(
                "global `{}` at dp[{}], {} words",
                slot.name,
                slot.offset,
                slot.size
            );
        }

        let mut order: Vec<usize> = (0..ast.procs.len()).collect();
        match ast.procs.iter().position(|proc| proc.name == entry) {
            Some(at) => {
                order.remove(at);
                order.insert(0, at);
            }

            None => self.messages.at(ast.span).lower_missing_entry(entry),
        }

        for (index, decl) in order.iter().enumerate() {
            let proc = self.declare_proc(index, &ast.procs[*decl]);
            self.program.procs.push(proc);
        }

        order
    }

    fn declare_proc(&mut self, index: usize, decl: &ast::ProcDecl) -> Procedure {
        let name = self.program.labels.named(decl.name.as_str());
        let mut frame = Frame::new(
            name,
            decl.formals
                .iter()
                .map(|formal| (formal.name.as_str(), formal.kind)),
        );

        let epilogue = self.program.labels.fresh();
        frame.set_epilogue(epilogue);

        for local in decl.locals.iter().filter(|local| local.kind.is_array()) {
            let offset = frame.alloc_array(local.name.as_str(), local.kind.size());
            trace!("local array `{}` at offset {offset}", local.name);
        }

        Procedure::new(name, decl.kind, index, frame)
    }
}
