use tracing::debug;

use crate::cuts::CutTally;
use crate::error::Result;
use crate::types::{Placement, Rect, Stock};

/// A free region of the sheet, positioned by its top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreeRect {
    pub x: u32,
    pub y: u32,
    pub rect: Rect,
}

impl FreeRect {
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self {
            x,
            y,
            rect: Rect::new(w, h),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoredPlacement {
    pub free_idx: usize,
    pub rotated: bool,
    /// Smaller of the two leftover margins; lower is tighter.
    pub score: u32,
}

/// Outcome of splitting one free region around a placed footprint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Split {
    pub regions: Vec<FreeRect>,
    pub cut_x: Option<u32>,
    pub cut_y: Option<u32>,
}

/// One stock sheet being filled.
///
/// Free regions are never merged. Every split produces children that are
/// disjoint and lie inside the region they replace, so the ledger stays a
/// disjoint cover of the unused area.
#[derive(Debug, Clone)]
pub struct Sheet {
    kerf: u32,
    free_rects: Vec<FreeRect>,
    placements: Vec<Placement>,
    cuts: CutTally,
}

impl Sheet {
    pub fn new(stock: &Stock) -> Result<Self> {
        let usable = stock.usable()?;
        Ok(Self {
            kerf: stock.kerf,
            free_rects: vec![FreeRect {
                x: stock.trim,
                y: stock.trim,
                rect: usable,
            }],
            placements: Vec::new(),
            cuts: CutTally::new(),
        })
    }

    pub fn free_rects(&self) -> &[FreeRect] {
        &self.free_rects
    }

    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    pub fn cuts(&self) -> &CutTally {
        &self.cuts
    }

    pub fn cut_count(&self) -> usize {
        self.cuts.count()
    }

    pub fn used_area(&self) -> u64 {
        self.placements.iter().map(|p| p.rect.area()).sum()
    }

    /// Best-short-side-fit search over the free regions.
    ///
    /// A candidate replaces the current best only on a strictly lower score,
    /// so earlier regions win ties, and within a region the unrotated
    /// orientation wins.
    pub fn find_best(&self, piece: Rect, allow_rotate: bool) -> Option<ScoredPlacement> {
        let mut best: Option<ScoredPlacement> = None;

        for (idx, free) in self.free_rects.iter().enumerate() {
            if self.admits(piece, free.rect) {
                let score = Self::score(piece, free.rect);
                if best.is_none_or(|b| score < b.score) {
                    best = Some(ScoredPlacement {
                        free_idx: idx,
                        rotated: false,
                        score,
                    });
                }
            }
            if allow_rotate && !piece.is_square() {
                let rotated = piece.rotated();
                if self.admits(rotated, free.rect) {
                    let score = Self::score(rotated, free.rect);
                    if best.is_none_or(|b| score < b.score) {
                        best = Some(ScoredPlacement {
                            free_idx: idx,
                            rotated: true,
                            score,
                        });
                    }
                }
            }
        }

        best
    }

    /// The piece plus one kerf on each axis must fit inside the region.
    fn admits(&self, piece: Rect, free: Rect) -> bool {
        let kerf = self.kerf as u64;
        piece.w as u64 + kerf <= free.w as u64 && piece.h as u64 + kerf <= free.h as u64
    }

    fn score(piece: Rect, free: Rect) -> u32 {
        std::cmp::min(free.w - piece.w, free.h - piece.h)
    }

    /// Places `piece` as chosen by [`Sheet::find_best`] and splits the region it lands in.
    pub fn place(&mut self, scored: ScoredPlacement, piece: Rect) -> Placement {
        let free = self.free_rects.remove(scored.free_idx);
        let placed = if scored.rotated {
            piece.rotated()
        } else {
            piece
        };

        let placement = Placement {
            rect: placed,
            x: free.x,
            y: free.y,
            rotated: scored.rotated,
            meta: (),
        };

        let footprint = Rect::new(placed.w + self.kerf, placed.h + self.kerf);
        let split = Self::split(free, footprint);
        if let Some(x) = split.cut_x {
            self.cuts.record_vertical(x);
        }
        if let Some(y) = split.cut_y {
            self.cuts.record_horizontal(y);
        }
        debug!(
            piece = %placed,
            x = free.x,
            y = free.y,
            rotated = scored.rotated,
            new_regions = split.regions.len(),
            "placed piece"
        );
        self.free_rects.extend(split.regions);
        self.placements.push(placement.clone());

        placement
    }

    /// Guillotine split of `free` around a footprint anchored at its
    /// top-left corner. `used` already includes the kerf.
    ///
    /// The narrower leftover strip is cut off first, next to the footprint;
    /// the wider one keeps the full extent of the original region.
    pub fn split(free: FreeRect, used: Rect) -> Split {
        let w = free.rect.w - used.w;
        let h = free.rect.h - used.h;
        let mut split = Split::default();

        if w <= h {
            if w > 0 {
                split
                    .regions
                    .push(FreeRect::new(free.x + used.w, free.y, w, used.h));
                split.cut_x = Some(free.x + used.w);
            }
            if h > 0 {
                split
                    .regions
                    .push(FreeRect::new(free.x, free.y + used.h, free.rect.w, h));
                split.cut_y = Some(free.y + used.h);
            }
        } else {
            if h > 0 {
                split
                    .regions
                    .push(FreeRect::new(free.x, free.y + used.h, used.w, h));
                split.cut_y = Some(free.y + used.h);
            }
            // w > h >= 0
            split
                .regions
                .push(FreeRect::new(free.x + used.w, free.y, w, free.rect.h));
            split.cut_x = Some(free.x + used.w);
        }

        split
    }
}
