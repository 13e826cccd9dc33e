use std::fmt::Write;

use super::{Frame, LocalKind, Location};
use crate::labels::Labels;
use crate::target::NUM_GPRS;

impl Frame {
    /// Describe the layout of this frame.
    pub fn dump(&self, labels: &Labels) -> String {
        let mut out = String::new();
        // Writing into a string cannot fail.
        let _ = self.write_dump(labels, &mut out);
        out
    }

    fn write_dump(&self, labels: &Labels, out: &mut String) -> std::fmt::Result {
        writeln!(out, "frame {} (size {})", labels.name(&self.name), self.size())?;

        writeln!(out, "  offsets:")?;
        writeln!(out, "    outgoing args   {}", self.out_arg_offset())?;
        writeln!(out, "    preserved regs  {}", self.preserved_offset())?;
        writeln!(out, "    arrays          {}", self.array_band_offset())?;
        writeln!(out, "    locals          {}", self.local_band_offset())?;
        writeln!(out, "    incoming args   {}", self.in_arg_offset())?;

        write!(out, "  registers:")?;
        for (reg, usage) in self.reg_usage.iter().enumerate().take(NUM_GPRS) {
            write!(out, " r{reg}:{usage:?}")?;
        }
        writeln!(out)?;

        if !self.formals.is_empty() {
            writeln!(out, "  formals:")?;
            for formal in self.formals.iter() {
                match formal.location {
                    Location::InReg(reg) => writeln!(out, "    {} in {reg}", formal.name)?,
                    Location::InFrame(offset) => {
                        writeln!(out, "    {} at caller sp[{offset}]", formal.name)?
                    }
                }
            }
        }

        if !self.locals.is_empty() {
            writeln!(out, "  locals:")?;
            for local in self.locals.iter() {
                let kind = match local.kind {
                    LocalKind::Array => "array",
                    LocalKind::Spill => "spill",
                };
                writeln!(out, "    {} {kind} at sp[{}]", local.name, local.offset)?;
            }
        }

        if !self.preserved.is_empty() {
            writeln!(out, "  preserved:")?;
            for (reg, offset) in self.preserved.iter() {
                writeln!(out, "    {reg} at sp[{offset}]")?;
            }
        }

        Ok(())
    }
}
