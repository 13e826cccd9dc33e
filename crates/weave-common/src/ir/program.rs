use std::collections::HashMap;

use super::Stmt;
use crate::ast::ProcKind;
use crate::frame::Frame;
use crate::labels::{Label, Labels};
use crate::target::{JUMP_INDEX_OFFSET, WORD_SIZE};

#[derive(Debug, Default)]
pub struct Program {
    pub procs: Vec<Procedure>,
    pub labels: Labels,
    pub data: DataPool,
    pub strings: StringPool,
}

impl Program {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &Label) -> Option<&Procedure> {
        self.procs.iter().find(|proc| &proc.name == name)
    }

    /// Everything a migrated call to `callee` has to carry along.
    pub fn closure(&self, callee: &Label) -> Closure {
        let proc = self
            .get(callee)
            .unwrap_or_else(|| panic!("inconsistency: no procedure for migrated call"));

        let children = proc
            .children
            .iter()
            .map(|child| {
                self.get(child)
                    .unwrap_or_else(|| panic!("inconsistency: unknown child procedure"))
                    .jump_index()
            })
            .collect();

        Closure {
            index: proc.jump_index(),
            children,
        }
    }

    /// Number of entries in the jump table, reserved entries included.
    pub fn jump_table_len(&self) -> usize {
        JUMP_INDEX_OFFSET + self.procs.len()
    }
}

/// The code a migrated call makes resident on the destination core.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Closure {
    pub index: usize,
    pub children: Vec<usize>,
}

#[derive(Debug)]
pub struct Procedure {
    pub name: Label,
    pub kind: ProcKind,
    /// Dense position of this procedure among all procedures.
    pub index: usize,
    pub frame: Frame,
    pub stmts: Vec<Stmt>,
    /// Every procedure transitively reachable through calls from this one.
    pub children: Vec<Label>,
}

impl Procedure {
    pub fn new(name: Label, kind: ProcKind, index: usize, frame: Frame) -> Self {
        Self {
            name,
            kind,
            index,
            frame,
            stmts: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn jump_index(&self) -> usize {
        self.index + JUMP_INDEX_OFFSET
    }

    pub fn add_child(&mut self, child: Label) {
        if !self.children.contains(&child) {
            self.children.push(child);
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Global {
    pub name: String,
    pub label: Label,
    /// Offset from the data pointer, in words.
    pub offset: u32,
    /// Size in words.
    pub size: u32,
}

/// Module variables, laid out one after the other from the data pointer.
#[derive(Debug, Default)]
pub struct DataPool {
    globals: Vec<Global>,
    by_name: HashMap<String, usize>,
    size: u32,
}

impl DataPool {
    pub fn add(&mut self, name: impl Into<String>, size: u32, label: Label) -> &Global {
        let name = name.into();
        let index = self.globals.len();
        assert!(
            self.by_name.insert(name.clone(), index).is_none(),
            "inconsistency: global `{name}` declared twice"
        );

        self.globals.push(Global {
            name,
            label,
            offset: self.size,
            size,
        });
        self.size += size;

        &self.globals[index]
    }

    pub fn get(&self, name: &str) -> Option<&Global> {
        self.by_name.get(name).map(|index| &self.globals[*index])
    }

    /// The label of a module variable's slot.
    pub fn location(&self, name: &str) -> Label {
        self.get(name)
            .unwrap_or_else(|| panic!("inconsistency: no data slot for `{name}`"))
            .label
    }

    pub fn iter(&self) -> impl Iterator<Item = &Global> {
        self.globals.iter()
    }

    /// Size in words.
    pub fn size(&self) -> u32 {
        self.size
    }
}

/// String literals in the constant pool.
#[derive(Debug, Default)]
pub struct StringPool {
    strings: Vec<(Label, String)>,
    size: u32,
}

impl StringPool {
    pub fn add(&mut self, label: Label, value: impl Into<String>) {
        let value = value.into();
        self.size += (value.len() as u32).div_ceil(WORD_SIZE);
        self.strings.push((label, value));
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Label, String)> {
        self.strings.iter()
    }

    /// Size in words.
    pub fn size(&self) -> u32 {
        self.size
    }
}
