//! Responsive grid arithmetic: column count, card width and per-card spacing
//! derived from the container width.

use crate::types::LayoutStyle;

/// Gap between cards
pub const MARGIN: f32 = 24.0;
/// Nominal card width used to derive the column count
pub const CARD_SIZE: f32 = 320.0;
/// Container padding, `floor(MARGIN / 2)`
pub const UL_PADDING: f32 = 12.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CardWidth {
    Fixed(f32),
    /// Take the whole row
    Full,
}

/// Four-sided spacing in points
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Spacing {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl Spacing {
    pub fn same(v: f32) -> Self {
        Self { left: v, right: v, top: v, bottom: v }
    }

    pub fn horizontal(&self) -> f32 {
        self.left + self.right
    }
}

/// Resolved width and margin of one card slot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardSpace {
    pub width: f32,
    pub margin: Spacing,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridMetrics {
    pub width: f32,
    pub count: usize,
    pub card_width: CardWidth,
}

impl GridMetrics {
    pub fn compute(width: f32) -> Self {
        let width = if width.is_finite() { width.max(0.0) } else { 0.0 };
        let count = (width / (CARD_SIZE + MARGIN)).floor() as usize;
        let card_width = if width >= CARD_SIZE + MARGIN * 2.0 {
            // width >= 368 guarantees count >= 1
            CardWidth::Fixed(((width - MARGIN * count as f32) / count as f32).floor())
        } else {
            CardWidth::Full
        };
        Self { width, count, card_width }
    }

    pub fn is_single_card(&self) -> bool {
        self.count <= 1
    }

    /// Cards per row
    pub fn columns(&self, style: LayoutStyle) -> usize {
        match style {
            LayoutStyle::List => 1,
            LayoutStyle::Grid if self.is_single_card() => 1,
            LayoutStyle::Grid => self.count,
        }
    }

    fn resolve(&self, card_width: CardWidth, margin: &Spacing) -> f32 {
        match card_width {
            CardWidth::Fixed(w) => w.max(0.0),
            CardWidth::Full => (self.width - margin.horizontal()).max(0.0),
        }
    }

    pub fn card_space(&self, style: LayoutStyle, idx: usize) -> CardSpace {
        match style {
            LayoutStyle::List => {
                let margin = Spacing::same(UL_PADDING / 2.0);
                CardSpace { width: self.resolve(CardWidth::Full, &margin), margin }
            }
            LayoutStyle::Grid if self.is_single_card() => CardSpace {
                width: (self.width - MARGIN).max(0.0),
                margin: Spacing::same(UL_PADDING),
            },
            LayoutStyle::Grid => {
                let margin = Spacing {
                    right: if (idx + 1) % self.count == 0 { 0.0 } else { MARGIN },
                    top: MARGIN,
                    ..Default::default()
                };
                CardSpace { width: self.resolve(self.card_width, &margin), margin }
            }
        }
    }

    pub fn container_padding(&self, style: LayoutStyle) -> Spacing {
        match style {
            LayoutStyle::List => Spacing::default(),
            LayoutStyle::Grid if self.is_single_card() => Spacing { bottom: MARGIN, ..Default::default() },
            LayoutStyle::Grid => Spacing { left: UL_PADDING, bottom: MARGIN, ..Default::default() },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wide_container_fits_four_columns() {
        let m = GridMetrics::compute(1400.0);
        assert_eq!(m.count, 4);
        assert_eq!(m.card_width, CardWidth::Fixed(326.0));
        assert!(!m.is_single_card());
        assert_eq!(m.columns(LayoutStyle::Grid), 4);
    }

    #[test]
    fn card_width_is_floored() {
        let m = GridMetrics::compute(1001.0);
        assert_eq!(m.count, 2);
        // (1001 - 48) / 2 = 476.5
        assert_eq!(m.card_width, CardWidth::Fixed(476.0));
    }

    #[test]
    fn narrow_container_is_single_full_width() {
        let m = GridMetrics::compute(360.0);
        assert_eq!(m.count, 1);
        assert_eq!(m.card_width, CardWidth::Full);
        assert!(m.is_single_card());

        let space = m.card_space(LayoutStyle::Grid, 0);
        assert_eq!(space.width, 336.0);
        assert_eq!(space.margin, Spacing::same(UL_PADDING));
    }

    #[test]
    fn zero_columns_still_single_card() {
        let m = GridMetrics::compute(200.0);
        assert_eq!(m.count, 0);
        assert!(m.is_single_card());
        assert_eq!(m.columns(LayoutStyle::Grid), 1);
    }

    #[test]
    fn degenerate_widths_are_non_negative() {
        for w in [0.0, -50.0, f32::NAN, f32::INFINITY, f32::NEG_INFINITY, 10.0] {
            let m = GridMetrics::compute(w);
            assert!(m.width >= 0.0);
            for style in [LayoutStyle::Grid, LayoutStyle::List] {
                let space = m.card_space(style, 0);
                assert!(space.width >= 0.0, "width {w} style {style:?}");
                assert!(m.columns(style) >= 1);
            }
        }
    }

    #[test]
    fn computation_is_deterministic() {
        for w in [0.0, 367.0, 368.0, 687.0, 688.0, 1920.0] {
            assert_eq!(GridMetrics::compute(w), GridMetrics::compute(w));
        }
    }

    #[test]
    fn last_column_has_no_right_margin() {
        let m = GridMetrics::compute(1400.0);
        let right: Vec<f32> = (0..8).map(|i| m.card_space(LayoutStyle::Grid, i).margin.right).collect();
        assert_eq!(right, vec![MARGIN, MARGIN, MARGIN, 0.0, MARGIN, MARGIN, MARGIN, 0.0]);
        assert!((0..8).all(|i| m.card_space(LayoutStyle::Grid, i).margin.top == MARGIN));
    }

    #[test]
    fn row_fits_inside_container() {
        for w in [688.0_f32, 900.0, 1031.0, 1400.0, 2560.0] {
            let m = GridMetrics::compute(w);
            let pad = m.container_padding(LayoutStyle::Grid);
            let row: f32 = (0..m.count)
                .map(|i| {
                    let s = m.card_space(LayoutStyle::Grid, i);
                    s.width + s.margin.horizontal()
                })
                .sum();
            assert!(pad.left + row <= w, "row overflows at {w}");
        }
    }

    #[test]
    fn list_style_switches_spacing_rules() {
        let m = GridMetrics::compute(1400.0);
        let grid = m.card_space(LayoutStyle::Grid, 0);
        let list = m.card_space(LayoutStyle::List, 0);
        assert_eq!(list.margin, Spacing::same(6.0));
        assert_eq!(list.width, 1388.0);
        assert_ne!(grid, list);
        assert_eq!(m.columns(LayoutStyle::List), 1);
        assert_eq!(m.container_padding(LayoutStyle::List), Spacing::default());
    }

    #[test]
    fn container_padding_depends_on_columns() {
        assert_eq!(
            GridMetrics::compute(1400.0).container_padding(LayoutStyle::Grid),
            Spacing { left: UL_PADDING, bottom: MARGIN, ..Default::default() }
        );
        assert_eq!(
            GridMetrics::compute(300.0).container_padding(LayoutStyle::Grid),
            Spacing { bottom: MARGIN, ..Default::default() }
        );
    }
}
