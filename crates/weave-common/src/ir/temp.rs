use std::collections::HashMap;

use super::{Reg, Temp};

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TempKind {
    Global,
    Local,
}

/// Where a temp ends up once allocation is done.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum Access {
    #[default]
    Undefined,
    Reg(Reg),
    /// A slot in the local band of the current frame.
    Frame(usize),
    /// A slot among the incoming arguments in the caller's frame.
    Caller(usize),
    /// The variable's own slot in the data pool.
    Data,
    /// Defined, but never live.
    Unused,
}

impl Access {
    pub fn is_defined(&self) -> bool {
        !matches!(self, Self::Undefined)
    }

    pub fn is_memory(&self) -> bool {
        matches!(self, Self::Frame(_) | Self::Caller(_) | Self::Data)
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TempInfo {
    pub name: String,
    pub kind: TempKind,
    pub access: Access,
    /// The variable this temp holds a reloaded or spilled copy of.
    pub spilled: Option<String>,
}

impl TempInfo {
    /// The source variable whose storage this temp stands for.
    pub fn origin(&self) -> &str {
        self.spilled.as_deref().unwrap_or(&self.name)
    }
}

/// The temps of one procedure, interned by name.
#[derive(Clone, Debug, Default)]
pub struct Temps {
    temps: Vec<TempInfo>,
    names: HashMap<String, Temp>,
    curr_gen: usize,
}

impl Temps {
    pub fn new() -> Self {
        Self {
            temps: Vec::new(),
            names: HashMap::new(),
            curr_gen: 0,
        }
    }

    /// Get the temp for the variable `name`, creating it if it doesn't exist
    /// yet. The kind of an existing temp is never changed.
    pub fn named(&mut self, name: impl Into<String>, kind: TempKind) -> Temp {
        let name = name.into();
        if let Some(temp) = self.names.get(&name) {
            return *temp;
        }

        let temp = Temp(self.temps.len());
        self.temps.push(TempInfo {
            name: name.clone(),
            kind,
            access: Access::Undefined,
            spilled: None,
        });
        self.names.insert(name, temp);
        temp
    }

    /// Create a temp with a generated name, `.T{n}`.
    pub fn fresh(&mut self, kind: TempKind) -> Temp {
        loop {
            let name = format!(".T{}", self.curr_gen);
            self.curr_gen += 1;

            if !self.names.contains_key(&name) {
                return self.named(name, kind);
            }
        }
    }

    pub fn lookup(&self, name: &str) -> Option<Temp> {
        self.names.get(name).copied()
    }

    pub fn get(&self, temp: &Temp) -> &TempInfo {
        &self.temps[temp.0]
    }

    pub fn get_mut(&mut self, temp: &Temp) -> &mut TempInfo {
        &mut self.temps[temp.0]
    }

    pub fn name(&self, temp: &Temp) -> &str {
        &self.get(temp).name
    }

    pub fn access(&self, temp: &Temp) -> Access {
        self.get(temp).access
    }

    pub fn set_access(&mut self, temp: &Temp, access: Access) {
        self.get_mut(temp).access = access;
    }

    pub fn set_spilled(&mut self, temp: &Temp, of: impl Into<String>) {
        self.get_mut(temp).spilled = Some(of.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = (Temp, &TempInfo)> {
        self.temps
            .iter()
            .enumerate()
            .map(|(id, info)| (Temp(id), info))
    }

    pub fn len(&self) -> usize {
        self.temps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.temps.is_empty()
    }
}
