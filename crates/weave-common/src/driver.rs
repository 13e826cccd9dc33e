use crate::message::Messages;

pub trait Driver {
    fn report(&mut self, messages: Messages);

    /// Output the IR for the given stage. The IR string is taken as a function,
    /// since generating it would usually be wasteful.
    fn output_ir(&mut self, at: IrOutput, data: impl FnOnce() -> String);

    /// The procedure placed first in the jump table.
    fn entry_name(&mut self) -> Option<String> {
        None
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum IrOutput {
    /// Linear IR straight out of the builder.
    Lowered,
    /// Block order after trace scheduling and branch fix-up.
    Scheduled,
    /// Final statements with every temp assigned.
    Allocated,
    /// Frame layouts once allocation has sized them.
    Frames,
}
