use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::guillotine::Sheet;
use crate::types::{Demand, Piece, Placement, SheetResult, Solution, Stock, expand_demands};

/// What one sheet made of an input list.
#[derive(Debug, Clone)]
pub struct PackOutcome<M> {
    pub sheet: SheetResult<M>,
    /// Pieces this sheet could not take, in input order.
    pub unplaced: Vec<Piece<M>>,
}

/// Rejects zero-sized pieces before any of them touches a sheet.
pub fn validate_pieces<M>(pieces: &[Piece<M>]) -> Result<()> {
    for (index, piece) in pieces.iter().enumerate() {
        if piece.rect.is_empty() {
            return Err(Error::InvalidPiece {
                index,
                reason: format!("dimensions must be non-zero, got {}", piece.rect),
            });
        }
    }
    Ok(())
}

/// Fills one fresh sheet with as many of `pieces` as fit, in the order given.
///
/// A piece that does not fit is set aside and the next one is tried, since a
/// smaller piece may still find a region.
pub fn pack_sheet<M>(stock: &Stock, pieces: Vec<Piece<M>>) -> Result<PackOutcome<M>> {
    validate_pieces(&pieces)?;
    let mut sheet = Sheet::new(stock)?;
    let mut placed: Vec<Placement<M>> = Vec::new();
    let mut unplaced = Vec::new();

    for piece in pieces {
        match sheet.find_best(piece.rect, piece.rotatable) {
            Some(scored) => {
                let placement = sheet.place(scored, piece.rect);
                placed.push(placement.with_meta(piece.meta));
            }
            None => {
                debug!(piece = %piece.rect, "no free region fits");
                unplaced.push(piece);
            }
        }
    }

    let used_area = sheet.used_area();
    let cuts = sheet.cuts();
    Ok(PackOutcome {
        sheet: SheetResult {
            placements: placed,
            cut_lines_x: cuts.vertical().collect(),
            cut_lines_y: cuts.horizontal().collect(),
            cut_count: cuts.count(),
            used_area,
            waste_area: stock.area() - used_area,
        },
        unplaced,
    })
}

pub struct Solver {
    stock: Stock,
}

impl Solver {
    pub fn new(stock: Stock) -> Result<Self> {
        stock.usable()?;
        Ok(Self { stock })
    }

    pub fn solve_demands<M: Clone>(&self, demands: &[Demand<M>]) -> Result<Solution<M>> {
        self.solve(expand_demands(demands)?)
    }

    /// Opens sheets one at a time, each packing whatever the previous one
    /// left over, until everything is placed or a fresh sheet places nothing.
    pub fn solve<M>(&self, pieces: Vec<Piece<M>>) -> Result<Solution<M>> {
        validate_pieces(&pieces)?;

        let total = pieces.len();
        let mut sheets = Vec::new();
        let mut remaining = pieces;

        while !remaining.is_empty() {
            let outcome = pack_sheet(&self.stock, remaining)?;
            remaining = outcome.unplaced;
            if outcome.sheet.placements.is_empty() {
                // An empty sheet took nothing, so no further sheet will either.
                warn!(
                    unplaced = remaining.len(),
                    stock = %self.stock.rect,
                    "pieces do not fit on an empty sheet"
                );
                break;
            }
            debug!(
                sheet = sheets.len() + 1,
                placed = outcome.sheet.placements.len(),
                cuts = outcome.sheet.cut_count,
                "sheet packed"
            );
            sheets.push(outcome.sheet);
        }

        let solution = Solution {
            sheets,
            unplaced: remaining,
            stock: self.stock,
        };
        info!(
            pieces = total,
            sheets = solution.sheet_count(),
            placed = solution.placed_count(),
            unplaced = solution.unplaced.len(),
            cuts = solution.total_cuts(),
            "solved"
        );
        Ok(solution)
    }
}
