use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    #[serde(deserialize_with = "deserialize_u32_from_number")]
    pub w: u32,
    #[serde(deserialize_with = "deserialize_u32_from_number")]
    pub h: u32,
}

impl Rect {
    pub fn new(w: u32, h: u32) -> Self {
        Self { w, h }
    }

    pub fn area(&self) -> u64 {
        self.w as u64 * self.h as u64
    }

    pub fn rotated(&self) -> Self {
        Self {
            w: self.h,
            h: self.w,
        }
    }

    pub fn is_square(&self) -> bool {
        self.w == self.h
    }

    pub fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }
}

impl std::fmt::Display for Rect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.w, self.h)
    }
}

/// Accepts any JSON number with an integral value that fits in a `u32`,
/// so clients may send `600.0` where `600` is meant.
pub fn deserialize_u32_from_number<'de, D>(deserializer: D) -> std::result::Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let n = serde_json::Number::deserialize(deserializer)?;
    if let Some(v) = n.as_u64() {
        return u32::try_from(v).map_err(|_| D::Error::custom(format!("{v} is out of range")));
    }
    match n.as_f64() {
        Some(f) if f >= 0.0 && f.fract() == 0.0 && f <= u32::MAX as f64 => Ok(f as u32),
        _ => Err(D::Error::custom(format!(
            "expected a non-negative integer, got {n}"
        ))),
    }
}

fn default_true() -> bool {
    true
}

/// Stock sheet dimensions plus the blade and edge allowances applied to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stock {
    pub rect: Rect,
    /// Blade width, consumed right of and below every placed piece.
    #[serde(default, deserialize_with = "deserialize_u32_from_number")]
    pub kerf: u32,
    /// Material trimmed from each edge before packing starts.
    #[serde(default, deserialize_with = "deserialize_u32_from_number")]
    pub trim: u32,
}

impl Stock {
    pub fn new(rect: Rect) -> Self {
        Self {
            rect,
            kerf: 0,
            trim: 0,
        }
    }

    pub fn with_kerf(mut self, kerf: u32) -> Self {
        self.kerf = kerf;
        self
    }

    pub fn with_trim(mut self, trim: u32) -> Self {
        self.trim = trim;
        self
    }

    pub fn area(&self) -> u64 {
        self.rect.area()
    }

    /// The region left for packing once the edge trim is taken off.
    pub fn usable(&self) -> Result<Rect> {
        if self.rect.is_empty() {
            return Err(Error::InvalidStock(format!(
                "dimensions must be non-zero, got {}",
                self.rect
            )));
        }
        let margin = self.trim as u64 * 2;
        if margin >= self.rect.w as u64 || margin >= self.rect.h as u64 {
            return Err(Error::InvalidStock(format!(
                "edge trim {} leaves nothing of {}",
                self.trim, self.rect
            )));
        }
        let margin = margin as u32;
        Ok(Rect::new(self.rect.w - margin, self.rect.h - margin))
    }
}

/// One requested piece. `meta` is carried through to the placement or the
/// unplaced list untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Piece<M = ()> {
    pub rect: Rect,
    #[serde(default = "default_true")]
    pub rotatable: bool,
    pub meta: M,
}

impl Piece<()> {
    pub fn new(rect: Rect) -> Self {
        Self::with_meta(rect, ())
    }
}

impl<M> Piece<M> {
    pub fn with_meta(rect: Rect, meta: M) -> Self {
        Self {
            rect,
            rotatable: true,
            meta,
        }
    }

    pub fn fixed(mut self) -> Self {
        self.rotatable = false;
        self
    }
}

/// Largest quantity a single demand may ask for.
pub const MAX_QTY: u32 = 10_000;

/// A piece size requested `qty` times.
#[derive(Debug, Clone)]
pub struct Demand<M = ()> {
    pub rect: Rect,
    pub qty: u32,
    pub allow_rotate: bool,
    pub meta: M,
}

/// Expands demands into individual pieces, keeping demand order.
pub fn expand_demands<M: Clone>(demands: &[Demand<M>]) -> Result<Vec<Piece<M>>> {
    let mut pieces = Vec::new();
    for (index, d) in demands.iter().enumerate() {
        if d.qty == 0 {
            return Err(Error::InvalidPiece {
                index,
                reason: format!("quantity of {} must be non-zero", d.rect),
            });
        }
        if d.qty > MAX_QTY {
            return Err(Error::InvalidPiece {
                index,
                reason: format!("quantity {} of {} exceeds {MAX_QTY}", d.qty, d.rect),
            });
        }
        for _ in 0..d.qty {
            pieces.push(Piece {
                rect: d.rect,
                rotatable: d.allow_rotate,
                meta: d.meta.clone(),
            });
        }
    }
    Ok(pieces)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Placement<M = ()> {
    /// Effective size, after rotation.
    pub rect: Rect,
    pub x: u32,
    pub y: u32,
    pub rotated: bool,
    pub meta: M,
}

impl<M> Placement<M> {
    pub fn right(&self) -> u32 {
        self.x + self.rect.w
    }

    pub fn bottom(&self) -> u32 {
        self.y + self.rect.h
    }

    pub fn overlaps<N>(&self, other: &Placement<N>) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    pub fn with_meta<N>(self, meta: N) -> Placement<N> {
        Placement {
            rect: self.rect,
            x: self.x,
            y: self.y,
            rotated: self.rotated,
            meta,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SheetResult<M = ()> {
    pub placements: Vec<Placement<M>>,
    /// Distinct x coordinates of vertical cuts, ascending.
    pub cut_lines_x: Vec<u32>,
    /// Distinct y coordinates of horizontal cuts, ascending.
    pub cut_lines_y: Vec<u32>,
    pub cut_count: usize,
    pub used_area: u64,
    pub waste_area: u64,
}

impl<M> SheetResult<M> {
    pub fn efficiency_percent(&self) -> f64 {
        let total = self.used_area + self.waste_area;
        if total == 0 {
            return 0.0;
        }
        self.used_area as f64 / total as f64 * 100.0
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Solution<M = ()> {
    pub sheets: Vec<SheetResult<M>>,
    /// Pieces that do not fit on an empty sheet in any allowed orientation.
    pub unplaced: Vec<Piece<M>>,
    pub stock: Stock,
}

impl<M> Solution<M> {
    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    pub fn placed_count(&self) -> usize {
        self.sheets.iter().map(|s| s.placements.len()).sum()
    }

    pub fn total_cuts(&self) -> usize {
        self.sheets.iter().map(|s| s.cut_count).sum()
    }

    pub fn total_waste_percent(&self) -> f64 {
        let total_stock_area = self.stock.area() * self.sheets.len() as u64;
        let total_used: u64 = self.sheets.iter().map(|s| s.used_area).sum();
        if total_stock_area == 0 {
            return 0.0;
        }
        (total_stock_area - total_used) as f64 / total_stock_area as f64 * 100.0
    }
}
