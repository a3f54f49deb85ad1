use crate::geometry::Point;
use crate::item::{Label, MenuItem};
use crate::selector::RingSelector;
use crate::{Color, LABEL_BASELINE_SHIFT, SECTOR_STEPS, SEPARATOR_WIDTH};

pub trait RenderAdapter {
    type Error;

    /// Fills a convex polygon. The painter only ever passes quads, one per
    /// step of an annular sector.
    fn fill_polygon(&mut self, points: &[Point], color: Color) -> Result<(), Self::Error>;

    fn draw_line(
        &mut self,
        from: Point,
        to: Point,
        color: Color,
        width: f64,
    ) -> Result<(), Self::Error>;

    /// Draws `label` horizontally centered on `anchor`, with the top of the
    /// text at `anchor.y`.
    fn draw_label(&mut self, label: &Label, anchor: Point) -> Result<(), Self::Error>;
}

/// Splits the annular sector between `start` and `end` into `steps` quads,
/// each ordered outer-start, outer-end, inner-end, inner-start.
pub fn annular_quads(
    center: Point,
    inner: f64,
    outer: f64,
    start: f64,
    end: f64,
    steps: usize,
) -> Vec<[Point; 4]> {
    let steps = steps.max(1);
    let theta = (end - start) / steps as f64;

    (0..steps)
        .map(|i| {
            let a0 = start + theta * i as f64;
            let a1 = start + theta * (i + 1) as f64;
            [
                center.polar(outer, a0),
                center.polar(outer, a1),
                center.polar(inner, a1),
                center.polar(inner, a0),
            ]
        })
        .collect()
}

struct SectorRenderer<'a, P> {
    item: &'a MenuItem<P>,
    center: Point,
    rot_offset: f64,
    inner: f64,
    outer: f64,
}

impl<'a, P> SectorRenderer<'a, P> {
    fn new(item: &'a MenuItem<P>, center: Point, rot_offset: f64) -> Self {
        Self {
            item,
            center,
            rot_offset,
            inner: item.inner_radius(),
            outer: item.outer_radius(),
        }
    }

    // stored sectors are in the pointer frame; undo the rotation for screen space
    fn start(&self) -> f64 {
        self.item.sector().start - self.rot_offset
    }

    fn end(&self) -> f64 {
        self.item.sector().end() - self.rot_offset
    }

    fn draw<R: RenderAdapter>(&self, adapter: &mut R, separator: Color) -> Result<(), R::Error> {
        self.draw_fill(adapter)?;
        self.draw_label(adapter)?;
        self.draw_separator(adapter, separator)
    }

    fn draw_fill<R: RenderAdapter>(&self, adapter: &mut R) -> Result<(), R::Error> {
        let color = self.item.color();
        for quad in annular_quads(
            self.center,
            self.inner,
            self.outer,
            self.start(),
            self.end(),
            SECTOR_STEPS,
        ) {
            adapter.fill_polygon(&quad, color)?;
        }
        Ok(())
    }

    fn draw_label<R: RenderAdapter>(&self, adapter: &mut R) -> Result<(), R::Error> {
        let mid = (self.start() + self.end()) / 2.0;
        let anchor = self.center.polar((self.inner + self.outer) / 2.0, mid);
        adapter.draw_label(
            self.item.label(),
            Point::new(anchor.x, anchor.y - LABEL_BASELINE_SHIFT),
        )
    }

    fn draw_separator<R: RenderAdapter>(
        &self,
        adapter: &mut R,
        color: Color,
    ) -> Result<(), R::Error> {
        let start = self.start();
        adapter.draw_line(
            self.center.polar(self.inner, start),
            self.center.polar(self.outer, start),
            color,
            SEPARATOR_WIDTH,
        )
    }
}

/// Paints every sector with its current color, its label, and a separator on
/// its starting edge drawn over the fill.
pub fn paint<P, R: RenderAdapter>(menu: &RingSelector<P>, adapter: &mut R) -> Result<(), R::Error> {
    let center = menu.center();
    for item in menu.items() {
        SectorRenderer::new(item, center, menu.rot_offset()).draw(adapter, menu.line_sep_color())?;
    }
    Ok(())
}
