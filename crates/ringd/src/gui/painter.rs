use cairo::Context;
use ringsel::{Color, Label, Point, RenderAdapter};

pub const BASE_FONT_SIZE: f64 = 14.0;

pub struct CairoPainter<'a> {
    cr: &'a Context,
    text_color: Color,
}

impl<'a> CairoPainter<'a> {
    pub fn new(cr: &'a Context, text_color: Color) -> Self {
        Self { cr, text_color }
    }

    fn set_source(&self, color: Color) {
        let (r, g, b, a) = color.into_components();
        self.cr.set_source_rgba(r, g, b, a);
    }
}

impl RenderAdapter for CairoPainter<'_> {
    type Error = cairo::Error;

    fn fill_polygon(&mut self, points: &[Point], color: Color) -> Result<(), cairo::Error> {
        let Some((first, rest)) = points.split_first() else {
            return Ok(());
        };
        self.set_source(color);
        self.cr.move_to(first.x, first.y);
        for p in rest {
            self.cr.line_to(p.x, p.y);
        }
        self.cr.close_path();
        self.cr.fill()
    }

    fn draw_line(
        &mut self,
        from: Point,
        to: Point,
        color: Color,
        width: f64,
    ) -> Result<(), cairo::Error> {
        self.set_source(color);
        self.cr.set_line_width(width);
        self.cr.move_to(from.x, from.y);
        self.cr.line_to(to.x, to.y);
        self.cr.stroke()
    }

    fn draw_label(&mut self, label: &Label, anchor: Point) -> Result<(), cairo::Error> {
        self.set_source(label.color.unwrap_or(self.text_color));
        self.cr
            .select_font_face("Sans", cairo::FontSlant::Normal, cairo::FontWeight::Normal);
        self.cr.set_font_size(BASE_FONT_SIZE * label.scale);

        let ext = self.cr.text_extents(&label.text)?;
        self.cr.move_to(
            anchor.x - ext.width() / 2.0 - ext.x_bearing(),
            anchor.y - ext.y_bearing(),
        );
        self.cr.show_text(&label.text)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cairo::{Format, ImageSurface};
    use ringsel::{MenuOptions, RingSelector, rgba8};

    #[test]
    fn test_paints_ring_onto_surface() {
        let mut surface = ImageSurface::create(Format::ARgb32, 100, 100).unwrap();
        {
            let cr = Context::new(&surface).unwrap();
            let mut menu: RingSelector<()> = RingSelector::new(
                MenuOptions::new(vec!["a".into(), "b".into()])
                    .center(50.0, 50.0)
                    .radii(10.0, 40.0)
                    .colors(rgba8(255, 0, 0, 255), rgba8(0, 0, 255, 255)),
            )
            .unwrap();
            menu.open();
            let mut painter = CairoPainter::new(&cr, rgba8(255, 255, 255, 255));
            menu.frame(Point::new(0.0, 0.0), &mut painter).unwrap();
        }
        surface.flush();

        let stride = surface.stride() as usize;
        let data = surface.data().unwrap();
        let pixel = |x: usize, y: usize| {
            let i = y * stride + x * 4;
            [data[i], data[i + 1], data[i + 2], data[i + 3]]
        };

        // native-endian ARGB32: bytes are B, G, R, A
        assert_eq!(pixel(50, 50), [0, 0, 0, 0]);
        assert_eq!(pixel(5, 5), [0, 0, 0, 0]);
        let ring = pixel(80, 53);
        assert!(ring[2] > 200 && ring[0] < 50, "{ring:?}");
    }
}
