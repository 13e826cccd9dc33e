pub mod ast;
pub mod frame;
pub mod ir;
pub mod labels;
pub mod message;
pub mod target;

pub use driver::{Driver, IrOutput};

mod driver;
