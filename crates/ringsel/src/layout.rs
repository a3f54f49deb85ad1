use crate::error::ConfigError;
use crate::item::MenuItem;
use std::f64::consts::TAU;

/// Slack allowed when comparing summed widths against a full turn.
pub const ANGLE_EPSILON: f64 = 1e-9;

/// Half-open angular range `[start, start + width)` in radians, measured
/// before any rotation offset is applied. The width is stored as given so an
/// explicit item width survives layout bit for bit.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Sector {
    pub start: f64,
    pub width: f64,
}

impl Sector {
    pub fn new(start: f64, width: f64) -> Self {
        Self { start, width }
    }

    pub fn end(&self) -> f64 {
        self.start + self.width
    }

    pub fn span(&self) -> f64 {
        self.width
    }

    pub fn mid(&self) -> f64 {
        self.start + self.span() / 2.0
    }

    /// `angle` must already be normalized into `[0, 2π)`. A sector ending at
    /// 2π (within [`ANGLE_EPSILON`]) owns every angle up to the wrap.
    pub fn contains(&self, angle: f64) -> bool {
        angle >= self.start && (angle < self.end() || self.end() >= TAU - ANGLE_EPSILON)
    }
}

/// Checks explicit widths and returns the share given to each item that has none.
///
/// The check is made on the total of all explicit widths, so the outcome does
/// not depend on the order of the items.
pub fn free_share(widths: &[Option<f64>]) -> Result<f64, ConfigError> {
    for (index, width) in widths.iter().enumerate() {
        match *width {
            Some(w) if !w.is_finite() || w <= 0.0 => {
                return Err(ConfigError::InvalidWidth { index, width: w });
            }
            Some(w) if w >= TAU => {
                return Err(ConfigError::WidthTooLarge { index, width: w });
            }
            _ => {}
        }
    }

    let claimed: f64 = widths.iter().flatten().sum();
    let unsized_count = widths.iter().filter(|w| w.is_none()).count();
    let remaining = TAU - claimed;

    if unsized_count == 0 {
        return if remaining < -ANGLE_EPSILON {
            Err(ConfigError::LayoutOverConstrained { claimed })
        } else if remaining > ANGLE_EPSILON {
            Err(ConfigError::LayoutIncomplete { claimed })
        } else {
            Ok(0.0)
        };
    }

    if remaining <= ANGLE_EPSILON {
        return Err(ConfigError::LayoutOverConstrained { claimed });
    }

    Ok(remaining / unsized_count as f64)
}

/// Assigns contiguous sectors starting at angle 0, then reverses the order if
/// `clockwise` is set. Stored angles never include the rotation offset.
pub fn assign_sectors<P>(items: &mut Vec<MenuItem<P>>, clockwise: bool) -> Result<(), ConfigError> {
    let widths: Vec<Option<f64>> = items.iter().map(|item| item.width).collect();
    let share = free_share(&widths)?;

    let last = items.len().saturating_sub(1);
    let mut offset = 0.0;
    for (i, item) in items.iter_mut().enumerate() {
        let width = match item.width {
            Some(w) => w,
            // takes up the rounding left by the summed shares
            None if i == last => TAU - offset,
            None => share,
        };
        item.sector = Sector::new(offset, width);
        offset += width;
    }

    if clockwise {
        items.reverse();
    }

    log::debug!(
        "Laid out {} sectors (free share {:.4} rad, clockwise: {})",
        items.len(),
        share,
        clockwise
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::{Defaults, normalize};
    use crate::{ItemRecord, ItemSpec, Label};
    use std::f64::consts::PI;

    fn laid_out(specs: Vec<ItemSpec<()>>, clockwise: bool) -> Result<Vec<MenuItem<()>>, ConfigError> {
        let mut items = normalize(specs, &Defaults::default())?;
        assign_sectors(&mut items, clockwise)?;
        Ok(items)
    }

    fn assert_tiles(items: &[MenuItem<()>]) {
        let mut sectors: Vec<Sector> = items.iter().map(|i| i.sector()).collect();
        sectors.sort_by(|a, b| a.start.total_cmp(&b.start));

        assert!(sectors[0].start.abs() < 1e-12);
        for pair in sectors.windows(2) {
            assert!((pair[0].end() - pair[1].start).abs() < 1e-12, "gap or overlap: {pair:?}");
        }
        let last = sectors.last().unwrap();
        assert!((last.end() - TAU).abs() < 1e-9);

        let total: f64 = sectors.iter().map(Sector::span).sum();
        assert!((total - TAU).abs() < 1e-9);
    }

    #[test]
    fn test_equal_shares() {
        let items = laid_out(vec!["a".into(), "b".into(), "c".into(), "d".into()], false).unwrap();

        assert_tiles(&items);
        for (i, item) in items.iter().enumerate() {
            assert!((item.sector().start - i as f64 * PI / 2.0).abs() < 1e-12);
            assert!((item.sector().span() - PI / 2.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_ring_closes_at_full_turn() {
        let just_below = f64::from_bits(TAU.to_bits() - 1);
        for n in 2..=12 {
            let specs: Vec<ItemSpec<()>> = (0..n).map(|i| Label::new(format!("{i}")).into()).collect();
            let items = laid_out(specs, false).unwrap();

            let last = items[n - 1].sector();
            assert_eq!(last.end(), TAU, "n = {n}");
            assert!(last.contains(just_below), "n = {n}");
            assert!(!items[0].sector().contains(just_below), "n = {n}");
        }
    }

    #[test]
    fn test_explicit_last_sector_reaches_the_wrap() {
        let items = laid_out(
            vec!["a".into(), "b".into(), "c".into(), ItemRecord::named("d").width(0.7).into()],
            false,
        )
        .unwrap();

        let last = items[3].sector();
        assert_eq!(last.span(), 0.7);
        assert!(last.contains(f64::from_bits(TAU.to_bits() - 1)));
        assert!(!last.contains(last.start - 1e-6));
    }

    #[test]
    fn test_explicit_width_is_exact() {
        let w = PI * 3.0 / 2.0;
        let items = laid_out(
            vec![
                "primary1".into(),
                "primary2".into(),
                ItemRecord::named("primary3").width(w).into(),
            ],
            false,
        )
        .unwrap();

        assert_tiles(&items);
        assert_eq!(items[2].sector().span(), w);
        assert_eq!(items[2].width(), Some(w));
        assert!((items[0].sector().span() - PI / 4.0).abs() < 1e-12);
        assert!((items[1].sector().span() - PI / 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_many_mixed_layouts_tile_the_circle() {
        for n in 2..12 {
            let specs: Vec<ItemSpec<()>> = (0..n)
                .map(|i| {
                    if i % 3 == 0 {
                        ItemRecord::named(format!("w{i}")).width(0.3).into()
                    } else {
                        Label::new(format!("item{i}")).into()
                    }
                })
                .collect();

            assert_tiles(&laid_out(specs.clone(), false).unwrap());
            assert_tiles(&laid_out(specs, true).unwrap());
        }
    }

    #[test]
    fn test_clockwise_reverses_order_and_keeps_widths() {
        let specs = || -> Vec<ItemSpec<()>> {
            vec![
                "a".into(),
                ItemRecord::named("b").width(1.0).into(),
                "c".into(),
            ]
        };
        let ccw = laid_out(specs(), false).unwrap();
        let cw = laid_out(specs(), true).unwrap();

        let n = ccw.len();
        for i in 0..n {
            assert_eq!(cw[i].label(), ccw[n - 1 - i].label());
            assert_eq!(cw[i].sector(), ccw[n - 1 - i].sector());
        }
        assert_eq!(cw[0].label().text, "c");
        assert_eq!(cw[1].sector().span(), 1.0);
    }

    #[test]
    fn test_width_too_large() {
        let err = laid_out(vec!["a".into(), ItemRecord::named("b").width(TAU).into()], false)
            .unwrap_err();
        assert_eq!(err, ConfigError::WidthTooLarge { index: 1, width: TAU });
    }

    #[test]
    fn test_over_constrained() {
        let err = laid_out(
            vec![
                ItemRecord::named("a").width(4.0).into(),
                ItemRecord::named("b").width(3.0).into(),
                "c".into(),
            ],
            false,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::LayoutOverConstrained { .. }));
    }

    #[test]
    fn test_over_constrained_regardless_of_order() {
        let specs = |flip: bool| -> Vec<ItemSpec<()>> {
            let mut v: Vec<ItemSpec<()>> = vec![
                "free".into(),
                ItemRecord::named("a").width(PI).into(),
                ItemRecord::named("b").width(PI).into(),
            ];
            if flip {
                v.reverse();
            }
            v
        };
        assert!(matches!(
            laid_out(specs(false), false),
            Err(ConfigError::LayoutOverConstrained { .. })
        ));
        assert!(matches!(
            laid_out(specs(true), false),
            Err(ConfigError::LayoutOverConstrained { .. })
        ));
    }

    #[test]
    fn test_all_explicit_widths_must_fill_the_circle() {
        let full = laid_out(
            vec![
                ItemRecord::named("a").width(PI).into(),
                ItemRecord::named("b").width(PI).into(),
            ],
            false,
        )
        .unwrap();
        assert_tiles(&full);

        let short = laid_out(
            vec![
                ItemRecord::named("a").width(1.0).into(),
                ItemRecord::named("b").width(1.0).into(),
            ],
            false,
        );
        assert!(matches!(short, Err(ConfigError::LayoutIncomplete { .. })));
    }

    #[test]
    fn test_non_positive_width_rejected() {
        let err = free_share(&[Some(0.0), None]).unwrap_err();
        assert_eq!(err, ConfigError::InvalidWidth { index: 0, width: 0.0 });
        assert!(free_share(&[None, Some(-1.0)]).is_err());
        assert!(free_share(&[Some(f64::NAN), None]).is_err());
    }

    #[test]
    fn test_sector_contains_is_half_open() {
        let s = Sector::new(0.0, PI / 2.0);
        assert_eq!(s.end(), PI / 2.0);
        assert!(s.contains(0.0));
        assert!(s.contains(PI / 4.0));
        assert!(!s.contains(PI / 2.0));
        assert!((s.mid() - PI / 4.0).abs() < 1e-12);
    }
}
