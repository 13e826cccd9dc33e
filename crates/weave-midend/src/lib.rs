mod lower;

use log::{info, trace};

use weave_common::ast;
use weave_common::ir::Program;
use weave_common::{Driver, IrOutput};

/// The procedure placed first when the driver doesn't name one.
pub const DEFAULT_ENTRY: &str = "main";

/// Build the linear IR for every procedure of `ast`. Returns `None` if any
/// errors were reported.
pub fn build(driver: &mut impl Driver, ast: &ast::Program) -> Option<Program> {
    info!("beginning ir construction");

    let entry = driver
        .entry_name()
        .unwrap_or_else(|| DEFAULT_ENTRY.to_string());

    let (program, messages) = lower::lower(ast, &entry);
    let failed = messages.has_errors();
    driver.report(messages);

    driver.output_ir(IrOutput::Lowered, || program.pretty(false));

    if failed {
        info!("ir construction failed");
        None
    } else {
        trace!("done building ir");
        Some(program)
    }
}
