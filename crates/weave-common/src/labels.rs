use std::collections::HashMap;

use bimap::BiMap;

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Label(usize);

/// The program-wide label table. Every label has a unique name; generated
/// labels are named `.L{n}`.
#[derive(Debug, Default)]
pub struct Labels {
    names: BiMap<Label, String>,
    positions: HashMap<Label, usize>,
    curr_gen: usize,
}

impl Labels {
    pub fn new() -> Self {
        Self {
            names: BiMap::new(),
            positions: HashMap::new(),
            curr_gen: 0,
        }
    }

    /// Get the label with the given name, creating it if it doesn't exist yet.
    pub fn named(&mut self, name: impl Into<String>) -> Label {
        let name = name.into();
        if let Some(label) = self.names.get_by_right(&name) {
            *label
        } else {
            let label = Label(self.names.len());
            self.names.insert(label, name);
            label
        }
    }

    /// Generate a label with a unique name.
    pub fn fresh(&mut self) -> Label {
        loop {
            let name = format!(".L{}", self.curr_gen);
            self.curr_gen += 1;

            if !self.names.contains_right(&name) {
                return self.named(name);
            }
        }
    }

    pub fn lookup(&self, name: &str) -> Option<Label> {
        self.names.get_by_right(name).copied()
    }

    pub fn name(&self, label: &Label) -> &str {
        // Labels are only produced by this table, so this never fails.
        self.names
            .get_by_left(label)
            .map(String::as_str)
            .unwrap_or_else(|| unreachable!())
    }

    pub fn rename(&mut self, label: &Label, name: impl Into<String>) {
        let name = name.into();
        assert!(
            !self.names.contains_right(&name),
            "inconsistency: label name `{name}` already taken"
        );

        self.names.insert(*label, name);
    }

    pub fn set_position(&mut self, label: Label, pos: usize) {
        self.positions.insert(label, pos);
    }

    pub fn position(&self, label: &Label) -> Option<usize> {
        self.positions.get(label).copied()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::Labels;

    #[test]
    fn fresh_labels_are_distinct() {
        let mut labels = Labels::new();
        let a = labels.fresh();
        let b = labels.fresh();

        assert_ne!(a, b);
        assert_eq!(".L0", labels.name(&a));
        assert_eq!(".L1", labels.name(&b));
    }

    #[test]
    fn named_labels_are_shared() {
        let mut labels = Labels::new();
        let a = labels.named("core");
        let b = labels.named("core");

        assert_eq!(a, b);
        assert_eq!(Some(a), labels.lookup("core"));
    }

    #[test]
    fn fresh_skips_taken_names() {
        let mut labels = Labels::new();
        let taken = labels.named(".L0");
        let fresh = labels.fresh();

        assert_ne!(taken, fresh);
        assert_eq!(".L1", labels.name(&fresh));
    }

    #[test]
    fn rename_keeps_identity() {
        let mut labels = Labels::new();
        let main = labels.named("main");
        labels.rename(&main, "_main");

        assert_eq!("_main", labels.name(&main));
        assert_eq!(None, labels.lookup("main"));
        assert_eq!(Some(main), labels.lookup("_main"));
    }
}
