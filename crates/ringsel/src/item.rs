use crate::layout::Sector;
use crate::selector::Handle;
use crate::{Color, Source};
use derive_more::{AsRef, Deref, Display, From, Into};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;

/// Name of a keyboard key as reported by the host (e.g. `"n"`, `"F1"`).
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Deref, From, Into, AsRef,
)]
#[serde(transparent)]
pub struct KeyName(String);

crate::impl_string_newtype!(KeyName);

impl KeyName {
    pub fn matches(&self, other: &KeyName) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub text: String,
    pub color: Option<Color>,
    pub scale: f64,
}

impl Label {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            color: None,
            scale: 1.0,
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl From<&str> for Label {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for Label {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

/// Selection callback. Receives the chosen item and a handle on the menu that
/// owns it, so it can close the menu.
pub struct Handler<P>(Rc<dyn Fn(&MenuItem<P>, &mut Handle<'_>)>);

impl<P> Handler<P> {
    pub fn new(f: impl Fn(&MenuItem<P>, &mut Handle<'_>) + 'static) -> Self {
        Self(Rc::new(f))
    }

    pub fn noop() -> Self {
        Self::new(|_, _| {})
    }

    pub fn call(&self, item: &MenuItem<P>, handle: &mut Handle<'_>) {
        (self.0)(item, handle)
    }
}

impl<P> Clone for Handler<P> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<P> fmt::Debug for Handler<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Handler(..)")
    }
}

/// Per-item overrides. Every `None` falls back to the menu-level value.
#[derive(Debug, Clone)]
pub struct ItemRecord<P> {
    pub name: Option<Label>,
    pub width: Option<f64>,
    pub key: Option<KeyName>,
    pub inner_radius: Option<Source<f64>>,
    pub outer_radius: Option<Source<f64>>,
    pub bg_color: Option<Color>,
    pub fg_color: Option<Color>,
    pub handler: Option<Handler<P>>,
    pub payload: Option<P>,
}

impl<P> Default for ItemRecord<P> {
    fn default() -> Self {
        Self {
            name: None,
            width: None,
            key: None,
            inner_radius: None,
            outer_radius: None,
            bg_color: None,
            fg_color: None,
            handler: None,
            payload: None,
        }
    }
}

impl<P> ItemRecord<P> {
    pub fn named(name: impl Into<Label>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn width(mut self, width: f64) -> Self {
        self.width = Some(width);
        self
    }

    pub fn key(mut self, key: impl Into<KeyName>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn inner_radius(mut self, radius: impl Into<Source<f64>>) -> Self {
        self.inner_radius = Some(radius.into());
        self
    }

    pub fn outer_radius(mut self, radius: impl Into<Source<f64>>) -> Self {
        self.outer_radius = Some(radius.into());
        self
    }

    pub fn colors(mut self, bg: Color, fg: Color) -> Self {
        self.bg_color = Some(bg);
        self.fg_color = Some(fg);
        self
    }

    pub fn handler(mut self, handler: impl Fn(&MenuItem<P>, &mut Handle<'_>) + 'static) -> Self {
        self.handler = Some(Handler::new(handler));
        self
    }

    pub fn payload(mut self, payload: P) -> Self {
        self.payload = Some(payload);
        self
    }
}

/// One entry of a menu as supplied by the caller.
#[derive(Debug, Clone)]
pub enum ItemSpec<P> {
    Label(Label),
    Record(ItemRecord<P>),
    /// An entry decoded from an untyped source that is neither of the above.
    /// The string names what was found (e.g. `"integer"`).
    Invalid(String),
}

impl<P> From<&str> for ItemSpec<P> {
    fn from(text: &str) -> Self {
        Self::Label(Label::new(text))
    }
}

impl<P> From<Label> for ItemSpec<P> {
    fn from(label: Label) -> Self {
        Self::Label(label)
    }
}

impl<P> From<ItemRecord<P>> for ItemSpec<P> {
    fn from(record: ItemRecord<P>) -> Self {
        Self::Record(record)
    }
}

#[derive(Debug, Clone)]
pub struct MenuItem<P> {
    pub(crate) label: Label,
    pub(crate) inner_radius: Source<f64>,
    pub(crate) outer_radius: Source<f64>,
    pub(crate) bg_color: Color,
    pub(crate) fg_color: Color,
    pub(crate) color: Color,
    pub(crate) sector: Sector,
    pub(crate) width: Option<f64>,
    pub(crate) key: Option<KeyName>,
    pub(crate) handler: Option<Handler<P>>,
    pub(crate) payload: Option<P>,
}

impl<P> MenuItem<P> {
    pub fn label(&self) -> &Label {
        &self.label
    }

    pub fn payload(&self) -> Option<&P> {
        self.payload.as_ref()
    }

    pub fn key(&self) -> Option<&KeyName> {
        self.key.as_ref()
    }

    pub fn sector(&self) -> Sector {
        self.sector
    }

    pub fn width(&self) -> Option<f64> {
        self.width
    }

    pub fn inner_radius(&self) -> f64 {
        self.inner_radius.get()
    }

    pub fn outer_radius(&self) -> f64 {
        self.outer_radius.get()
    }

    pub fn bg_color(&self) -> Color {
        self.bg_color
    }

    pub fn fg_color(&self) -> Color {
        self.fg_color
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn contains_radius(&self, distance: f64) -> bool {
        distance >= self.inner_radius() && distance <= self.outer_radius()
    }
}
