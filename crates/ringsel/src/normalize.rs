use crate::error::ConfigError;
use crate::item::{ItemRecord, ItemSpec, MenuItem};
use crate::layout::Sector;
use crate::{
    Color, DEFAULT_BG_COLOR, DEFAULT_FG_COLOR, INNER_RADIUS_DIVISOR, OUTER_RADIUS_DIVISOR,
    REFERENCE_VIEWPORT, Size, Source,
};

#[derive(Debug, Clone)]
pub struct Defaults {
    pub inner_radius: Source<f64>,
    pub outer_radius: Source<f64>,
    pub bg_color: Color,
    pub fg_color: Color,
}

impl Defaults {
    /// Fallbacks scaled to the viewport height, re-evaluated on every read.
    pub fn for_viewport(viewport: &Source<Size>) -> Self {
        Self {
            inner_radius: viewport.map(|size| size.height / INNER_RADIUS_DIVISOR),
            outer_radius: viewport.map(|size| size.height / OUTER_RADIUS_DIVISOR),
            bg_color: DEFAULT_BG_COLOR,
            fg_color: DEFAULT_FG_COLOR,
        }
    }
}

impl Default for Defaults {
    fn default() -> Self {
        Self::for_viewport(&Source::Fixed(REFERENCE_VIEWPORT))
    }
}

/// Turns caller item specs into menu items, preserving their order.
/// Sectors are left empty; see [`crate::layout::assign_sectors`].
pub fn normalize<P>(
    specs: Vec<ItemSpec<P>>,
    defaults: &Defaults,
) -> Result<Vec<MenuItem<P>>, ConfigError> {
    if specs.is_empty() {
        return Err(ConfigError::NoItems);
    }

    specs
        .into_iter()
        .enumerate()
        .map(|(index, spec)| match spec {
            ItemSpec::Label(label) => from_record(ItemRecord::named(label), index, defaults),
            ItemSpec::Record(record) => from_record(record, index, defaults),
            ItemSpec::Invalid(found) => Err(ConfigError::InvalidItemType { index, found }),
        })
        .collect()
}

fn from_record<P>(
    record: ItemRecord<P>,
    index: usize,
    defaults: &Defaults,
) -> Result<MenuItem<P>, ConfigError> {
    let label = record
        .name
        .ok_or(ConfigError::InvalidItemName { index })?;
    let bg_color = record.bg_color.unwrap_or(defaults.bg_color);

    Ok(MenuItem {
        label,
        inner_radius: record
            .inner_radius
            .unwrap_or_else(|| defaults.inner_radius.clone()),
        outer_radius: record
            .outer_radius
            .unwrap_or_else(|| defaults.outer_radius.clone()),
        bg_color,
        fg_color: record.fg_color.unwrap_or(defaults.fg_color),
        color: bg_color,
        sector: Sector::default(),
        width: record.width,
        key: record.key,
        handler: record.handler,
        payload: record.payload,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{KeyName, Label, rgba8};
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_labels_and_records_keep_order() {
        let items = normalize::<()>(
            vec![
                "primary1".into(),
                ItemRecord::named(Label::new("primary2").with_scale(1.5))
                    .key("n")
                    .into(),
                ItemRecord::named("primary3").width(1.0).into(),
            ],
            &Defaults::default(),
        )
        .unwrap();

        let names: Vec<&str> = items.iter().map(|i| i.label().text.as_str()).collect();
        assert_eq!(names, ["primary1", "primary2", "primary3"]);
        assert_eq!(items[1].label().scale, 1.5);
        assert_eq!(items[1].key(), Some(&KeyName::from("n")));
        assert_eq!(items[2].width(), Some(1.0));
        assert_eq!(items[0].width(), None);
    }

    #[test]
    fn test_overrides_take_precedence() {
        let bg = rgba8(150, 150, 0, 100);
        let fg = rgba8(150, 150, 0, 200);
        let defaults = Defaults {
            inner_radius: 40.0.into(),
            outer_radius: 120.0.into(),
            bg_color: DEFAULT_BG_COLOR,
            fg_color: DEFAULT_FG_COLOR,
        };

        let items = normalize::<()>(
            vec![
                "plain".into(),
                ItemRecord::named("custom")
                    .inner_radius(0.0)
                    .colors(bg, fg)
                    .into(),
            ],
            &defaults,
        )
        .unwrap();

        assert_eq!(items[0].inner_radius(), 40.0);
        assert_eq!(items[0].outer_radius(), 120.0);
        assert_eq!(items[0].bg_color(), DEFAULT_BG_COLOR);
        assert_eq!(items[0].color(), DEFAULT_BG_COLOR);

        assert_eq!(items[1].inner_radius(), 0.0);
        assert_eq!(items[1].outer_radius(), 120.0);
        assert_eq!(items[1].bg_color(), bg);
        assert_eq!(items[1].fg_color(), fg);
        assert_eq!(items[1].color(), bg);
    }

    #[test]
    fn test_viewport_defaults_follow_resizes() {
        let viewport = Rc::new(Cell::new(Size::new(1920.0, 800.0)));
        let source = {
            let viewport = viewport.clone();
            Source::dynamic(move || viewport.get())
        };
        let items = normalize::<()>(vec!["a".into()], &Defaults::for_viewport(&source)).unwrap();

        assert_eq!(items[0].inner_radius(), 100.0);
        viewport.set(Size::new(1920.0, 1600.0));
        assert_eq!(items[0].inner_radius(), 200.0);
        assert!((items[0].outer_radius() - 1600.0 / OUTER_RADIUS_DIVISOR).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_entries() {
        let err = normalize::<()>(
            vec!["ok".into(), ItemSpec::Invalid("integer".to_string())],
            &Defaults::default(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidItemType {
                index: 1,
                found: "integer".to_string()
            }
        );

        let err = normalize::<()>(
            vec![ItemRecord::default().width(1.0).into()],
            &Defaults::default(),
        )
        .unwrap_err();
        assert_eq!(err, ConfigError::InvalidItemName { index: 0 });

        let err = normalize::<()>(Vec::new(), &Defaults::default()).unwrap_err();
        assert_eq!(err, ConfigError::NoItems);
    }
}
