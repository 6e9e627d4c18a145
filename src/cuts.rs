use std::collections::BTreeSet;

/// Distinct guillotine cut positions on one sheet.
///
/// Two splits landing on the same coordinate count once, on the
/// assumption that one saw pass serves both. Whether that line really
/// spans the sheet when it is cut is not checked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CutTally {
    xs: BTreeSet<u32>,
    ys: BTreeSet<u32>,
}

impl CutTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a vertical cut at `x`. Returns false if the line was already counted.
    pub fn record_vertical(&mut self, x: u32) -> bool {
        self.xs.insert(x)
    }

    /// Records a horizontal cut at `y`. Returns false if the line was already counted.
    pub fn record_horizontal(&mut self, y: u32) -> bool {
        self.ys.insert(y)
    }

    pub fn count(&self) -> usize {
        self.xs.len() + self.ys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    pub fn vertical(&self) -> impl Iterator<Item = u32> + '_ {
        self.xs.iter().copied()
    }

    pub fn horizontal(&self) -> impl Iterator<Item = u32> + '_ {
        self.ys.iter().copied()
    }
}
