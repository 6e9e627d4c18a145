use crate::types::{SheetResult, Stock};

const MAX_WIDTH: f64 = 80.0;
const MAX_HEIGHT: f64 = 40.0;

/// Character grid the sheet is scaled onto.
struct Canvas {
    cells: Vec<Vec<char>>,
    scale: f64,
}

impl Canvas {
    fn new(stock: &Stock) -> Option<Self> {
        let scale = f64::min(
            MAX_WIDTH / stock.rect.w as f64,
            MAX_HEIGHT / stock.rect.h as f64,
        );
        let cols = (stock.rect.w as f64 * scale).round() as usize;
        let rows = (stock.rect.h as f64 * scale).round() as usize;
        if cols == 0 || rows == 0 {
            return None;
        }
        Some(Self {
            cells: vec![vec![' '; cols + 1]; rows + 1],
            scale,
        })
    }

    fn project(&self, v: u32) -> usize {
        (v as f64 * self.scale).round() as usize
    }

    fn set(&mut self, col: usize, row: usize, ch: char) {
        if let Some(cell) = self.cells.get_mut(row).and_then(|r| r.get_mut(col)) {
            *cell = match (*cell, ch) {
                ('+', _) | ('-', '|') | ('|', '-') => '+',
                _ => ch,
            };
        }
    }

    /// Outline in sheet units.
    fn outline(&mut self, x: u32, y: u32, w: u32, h: u32) {
        let (x0, y0) = (self.project(x), self.project(y));
        let (x1, y1) = (self.project(x + w), self.project(y + h));
        for col in x0..=x1 {
            self.set(col, y0, '-');
            self.set(col, y1, '-');
        }
        for row in y0..=y1 {
            self.set(x0, row, '|');
            self.set(x1, row, '|');
        }
        for (col, row) in [(x0, y0), (x1, y0), (x0, y1), (x1, y1)] {
            self.set(col, row, '+');
        }
    }

    /// Dotted guide along a cut line; only fills blank cells.
    fn guide(&mut self, from: (u32, u32), to: (u32, u32), ch: char) {
        let (c0, r0) = (self.project(from.0), self.project(from.1));
        let (c1, r1) = (self.project(to.0), self.project(to.1));
        for row in r0..=r1 {
            for col in c0..=c1 {
                if let Some(cell) = self.cells.get_mut(row).and_then(|r| r.get_mut(col))
                    && *cell == ' '
                {
                    *cell = ch;
                }
            }
        }
    }

    /// Writes `label` centred inside an outline, if it fits between the borders.
    fn label(&mut self, x: u32, y: u32, w: u32, h: u32, label: &str) {
        let (x0, y0) = (self.project(x), self.project(y));
        let (x1, y1) = (self.project(x + w), self.project(y + h));
        let len = label.chars().count();
        if y1 <= y0 + 1 || x1 <= x0 + len {
            return;
        }
        let row = (y0 + y1) / 2;
        let start = (x0 + x1) / 2 - len / 2;
        for (i, ch) in label.chars().enumerate() {
            if let Some(cell) = self.cells.get_mut(row).and_then(|r| r.get_mut(start + i)) {
                *cell = ch;
            }
        }
    }

    fn finish(self) -> String {
        let mut out = String::new();
        for row in &self.cells {
            let line: String = row.iter().collect();
            out.push_str(line.trim_end());
            out.push('\n');
        }
        out
    }
}

/// Draws one sheet: cut lines as `:` (vertical) and `.` (horizontal) across
/// the usable area, then each placement labelled with its effective size.
pub fn render_sheet<M>(stock: &Stock, sheet: &SheetResult<M>) -> String {
    let Some(mut canvas) = Canvas::new(stock) else {
        return String::new();
    };

    canvas.outline(0, 0, stock.rect.w, stock.rect.h);
    let Ok(usable) = stock.usable() else {
        return canvas.finish();
    };
    let (lo_x, lo_y) = (stock.trim, stock.trim);
    let (hi_x, hi_y) = (lo_x + usable.w, lo_y + usable.h);
    if stock.trim > 0 {
        canvas.outline(lo_x, lo_y, usable.w, usable.h);
    }

    for &x in &sheet.cut_lines_x {
        canvas.guide((x, lo_y), (x, hi_y), ':');
    }
    for &y in &sheet.cut_lines_y {
        canvas.guide((lo_x, y), (hi_x, y), '.');
    }

    for p in &sheet.placements {
        canvas.outline(p.x, p.y, p.rect.w, p.rect.h);
        canvas.label(p.x, p.y, p.rect.w, p.rect.h, &p.rect.to_string());
    }

    canvas.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Placement, Rect};

    fn placement(w: u32, h: u32, x: u32, y: u32) -> Placement {
        Placement {
            rect: Rect::new(w, h),
            x,
            y,
            rotated: false,
            meta: (),
        }
    }

    fn sheet(placements: Vec<Placement>, xs: Vec<u32>, ys: Vec<u32>) -> SheetResult {
        let used_area = placements.iter().map(|p| p.rect.area()).sum();
        SheetResult {
            placements,
            cut_count: xs.len() + ys.len(),
            cut_lines_x: xs,
            cut_lines_y: ys,
            used_area,
            waste_area: 0,
        }
    }

    #[test]
    fn test_render_single_piece() {
        let stock = Stock::new(Rect::new(100, 50));
        let output = render_sheet(&stock, &sheet(vec![placement(100, 50, 0, 0)], vec![], vec![]));
        assert!(output.contains('+'));
        assert!(output.contains('-'));
        assert!(output.contains('|'));
        assert!(output.contains("100x50"));
    }

    #[test]
    fn test_render_two_pieces() {
        let stock = Stock::new(Rect::new(100, 100));
        let placements = vec![placement(50, 100, 0, 0), placement(50, 100, 50, 0)];
        let output = render_sheet(&stock, &sheet(placements, vec![50], vec![]));
        assert_eq!(output.matches("50x100").count(), 2);
    }

    #[test]
    fn test_render_empty() {
        let stock = Stock::new(Rect::new(100, 100));
        let output = render_sheet(&stock, &sheet(vec![], vec![], vec![]));
        assert!(output.contains('+'));
        assert_eq!(output.lines().count(), 41);
    }

    #[test]
    fn test_render_cut_lines() {
        let stock = Stock::new(Rect::new(100, 100));
        let without = render_sheet(&stock, &sheet(vec![placement(50, 30, 0, 0)], vec![], vec![]));
        assert!(!without.contains(':') && !without.contains('.'));

        // the vertical line at x=50 runs on below the piece, the horizontal
        // one at y=30 runs on past its right edge
        let output = render_sheet(&stock, &sheet(vec![placement(50, 30, 0, 0)], vec![50], vec![30]));
        let rows: Vec<&str> = output.lines().collect();
        assert_eq!(rows[30].chars().nth(20), Some(':'));
        assert_eq!(rows[12].chars().nth(30), Some('.'));
    }

    #[test]
    fn test_render_trim_border() {
        let plain = render_sheet(&Stock::new(Rect::new(100, 100)), &sheet(vec![], vec![], vec![]));
        let trimmed = render_sheet(
            &Stock::new(Rect::new(100, 100)).with_trim(10),
            &sheet(vec![], vec![], vec![]),
        );
        assert!(trimmed.matches('+').count() > plain.matches('+').count());
    }
}
