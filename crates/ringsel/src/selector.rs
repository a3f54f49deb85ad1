use crate::ease::Easing;
use crate::error::ConfigError;
use crate::geometry::Point;
use crate::hover;
use crate::item::{Handler, ItemSpec, KeyName, MenuItem};
use crate::layout;
use crate::normalize::{self, Defaults};
use crate::render::{self, RenderAdapter};
use crate::{Color, DEFAULT_LINE_SEP_COLOR, REFERENCE_VIEWPORT, Size, Source};
use strum::Display;

/// Lifecycle of a menu. `Closing` is closed as far as the user is concerned;
/// ticks keep easing colors back to idle until every item rests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
pub enum Phase {
    #[default]
    Closed,
    Open,
    Closing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MenuState {
    pub phase: Phase,
    pub hovered: Option<usize>,
}

impl MenuState {
    fn open(&mut self) {
        self.phase = Phase::Open;
        self.hovered = None;
    }

    fn close(&mut self) {
        if self.phase == Phase::Open {
            self.phase = Phase::Closing;
            self.hovered = None;
        }
    }
}

/// Handed to selection handlers so they can drive the menu that invoked them.
#[derive(Debug)]
pub struct Handle<'a> {
    state: &'a mut MenuState,
}

impl<'a> Handle<'a> {
    pub(crate) fn new(state: &'a mut MenuState) -> Self {
        Self { state }
    }

    pub fn open(&mut self) {
        self.state.open();
    }

    pub fn close(&mut self) {
        self.state.close();
    }

    pub fn is_open(&self) -> bool {
        self.state.phase == Phase::Open
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum HandlerScope {
    Item,
    Menu,
}

#[derive(Debug, Clone)]
pub struct MenuOptions<P> {
    pub items: Vec<ItemSpec<P>>,
    pub center: Option<(Source<f64>, Source<f64>)>,
    pub inner_radius: Option<Source<f64>>,
    pub outer_radius: Option<Source<f64>>,
    pub rot_offset: f64,
    pub clockwise: bool,
    pub bg_color: Option<Color>,
    pub fg_color: Option<Color>,
    pub line_sep_color: Option<Color>,
    pub handler: Option<Handler<P>>,
    pub viewport: Source<Size>,
    pub easing: Easing,
}

impl<P> MenuOptions<P> {
    pub fn new(items: Vec<ItemSpec<P>>) -> Self {
        Self {
            items,
            center: None,
            inner_radius: None,
            outer_radius: None,
            rot_offset: 0.0,
            clockwise: false,
            bg_color: None,
            fg_color: None,
            line_sep_color: None,
            handler: None,
            viewport: Source::Fixed(REFERENCE_VIEWPORT),
            easing: Easing::default(),
        }
    }

    pub fn center(mut self, x: impl Into<Source<f64>>, y: impl Into<Source<f64>>) -> Self {
        self.center = Some((x.into(), y.into()));
        self
    }

    pub fn radii(mut self, inner: impl Into<Source<f64>>, outer: impl Into<Source<f64>>) -> Self {
        self.inner_radius = Some(inner.into());
        self.outer_radius = Some(outer.into());
        self
    }

    pub fn rot_offset(mut self, radians: f64) -> Self {
        self.rot_offset = radians;
        self
    }

    pub fn clockwise(mut self, clockwise: bool) -> Self {
        self.clockwise = clockwise;
        self
    }

    pub fn colors(mut self, bg: Color, fg: Color) -> Self {
        self.bg_color = Some(bg);
        self.fg_color = Some(fg);
        self
    }

    pub fn line_sep_color(mut self, color: Color) -> Self {
        self.line_sep_color = Some(color);
        self
    }

    pub fn handler(mut self, handler: impl Fn(&MenuItem<P>, &mut Handle<'_>) + 'static) -> Self {
        self.handler = Some(Handler::new(handler));
        self
    }

    pub fn viewport(mut self, viewport: impl Into<Source<Size>>) -> Self {
        self.viewport = viewport.into();
        self
    }

    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }
}

/// A ring menu: owns its items and state, resolves hover, eases colors and
/// dispatches selections.
#[derive(Debug)]
pub struct RingSelector<P> {
    items: Vec<MenuItem<P>>,
    state: MenuState,
    center: (Source<f64>, Source<f64>),
    rot_offset: f64,
    line_sep_color: Color,
    handler: Handler<P>,
    easing: Easing,
}

impl<P> RingSelector<P> {
    pub fn new(options: MenuOptions<P>) -> Result<Self, ConfigError> {
        let MenuOptions {
            items,
            center,
            inner_radius,
            outer_radius,
            rot_offset,
            clockwise,
            bg_color,
            fg_color,
            line_sep_color,
            handler,
            viewport,
            easing,
        } = options;

        let fallback = Defaults::for_viewport(&viewport);
        let defaults = Defaults {
            inner_radius: inner_radius.unwrap_or(fallback.inner_radius),
            outer_radius: outer_radius.unwrap_or(fallback.outer_radius),
            bg_color: bg_color.unwrap_or(fallback.bg_color),
            fg_color: fg_color.unwrap_or(fallback.fg_color),
        };

        let mut items = normalize::normalize(items, &defaults)?;
        layout::assign_sectors(&mut items, clockwise)?;

        let center = center.unwrap_or_else(|| {
            (
                viewport.map(|size| size.center().x),
                viewport.map(|size| size.center().y),
            )
        });

        Ok(Self {
            items,
            state: MenuState::default(),
            center,
            rot_offset,
            line_sep_color: line_sep_color.unwrap_or(DEFAULT_LINE_SEP_COLOR),
            handler: handler.unwrap_or_else(Handler::noop),
            easing,
        })
    }

    pub fn open(&mut self) {
        log::debug!("Opening ring menu ({} -> {})", self.state.phase, Phase::Open);
        self.state.open();
    }

    /// Idempotent; a menu that is not open is left untouched.
    pub fn close(&mut self) {
        if self.state.phase == Phase::Open {
            log::debug!("Closing ring menu");
        }
        self.state.close();
    }

    pub fn is_open(&self) -> bool {
        self.state.phase == Phase::Open
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn state(&self) -> MenuState {
        self.state
    }

    pub fn hovered(&self) -> Option<usize> {
        self.state.hovered
    }

    pub fn hovered_item(&self) -> Option<&MenuItem<P>> {
        self.state.hovered.and_then(|i| self.items.get(i))
    }

    pub fn items(&self) -> &[MenuItem<P>] {
        &self.items
    }

    pub fn center(&self) -> Point {
        Point::new(self.center.0.get(), self.center.1.get())
    }

    pub fn rot_offset(&self) -> f64 {
        self.rot_offset
    }

    pub fn line_sep_color(&self) -> Color {
        self.line_sep_color
    }

    /// Recomputes hover for `pointer`. Returns true when the hovered item
    /// changed. Does nothing unless the menu is open.
    pub fn update_hover(&mut self, pointer: Point) -> bool {
        if !self.is_open() {
            return false;
        }
        let hovered = hover::hit_test(&self.items, self.center(), self.rot_offset, pointer);
        let changed = hovered != self.state.hovered;
        self.state.hovered = hovered;
        changed
    }

    /// One render frame: hover is resolved before anything is painted.
    pub fn frame<R: RenderAdapter>(
        &mut self,
        pointer: Point,
        adapter: &mut R,
    ) -> Result<(), R::Error> {
        if !self.is_open() {
            return Ok(());
        }
        self.update_hover(pointer);
        self.paint(adapter)
    }

    pub fn paint<R: RenderAdapter>(&self, adapter: &mut R) -> Result<(), R::Error> {
        render::paint(self, adapter)
    }

    /// Advances every item's color one easing step. Returns true when any
    /// color changed, i.e. a redraw is due.
    pub fn tick(&mut self) -> bool {
        if self.state.phase == Phase::Closed {
            return false;
        }

        let hovered = self.state.hovered;
        let mut changed = false;
        for (i, item) in self.items.iter_mut().enumerate() {
            let target = if hovered == Some(i) {
                item.fg_color
            } else {
                item.bg_color
            };
            let next = self.easing.step_color(item.color, target);
            changed |= next != item.color;
            item.color = next;
        }

        if self.state.phase == Phase::Closing && !changed {
            log::debug!("Ring menu settled");
            self.state.phase = Phase::Closed;
        }
        changed
    }

    pub fn click(&mut self) -> Option<HandlerScope> {
        if !self.is_open() {
            return None;
        }
        let index = self.state.hovered?;
        self.dispatch(index)
    }

    /// Selects the first item bound to `key`, regardless of hover.
    pub fn key_typed(&mut self, key: &KeyName) -> Option<HandlerScope> {
        if !self.is_open() {
            return None;
        }
        let index = self
            .items
            .iter()
            .position(|item| item.key.as_ref().is_some_and(|k| k.matches(key)))?;
        self.dispatch(index)
    }

    fn dispatch(&mut self, index: usize) -> Option<HandlerScope> {
        let item = self.items.get(index)?;
        let (handler, scope) = match &item.handler {
            Some(handler) => (handler, HandlerScope::Item),
            None => (&self.handler, HandlerScope::Menu),
        };

        log::debug!("Selected '{}' ({} handler)", item.label, scope);
        handler.call(item, &mut Handle::new(&mut self.state));
        Some(scope)
    }
}
