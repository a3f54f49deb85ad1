//! Ring selector engine: lays items out as sectors of a circle, resolves which
//! sector the pointer is over, eases sector colors, and dispatches selections.
//!
//! Drawing goes through [`RenderAdapter`]; the host owns the window, the event
//! loop and the fixed-rate tick.

pub mod ease;
pub mod error;
pub mod geometry;
pub mod hover;
pub mod item;
pub mod layout;
pub mod macros;
pub mod normalize;
pub mod render;
pub mod selector;
pub mod source;

pub use ease::Easing;
pub use error::ConfigError;
pub use geometry::{Point, Size, normalize_angle};
pub use item::{Handler, ItemRecord, ItemSpec, KeyName, Label, MenuItem};
pub use layout::Sector;
pub use render::RenderAdapter;
pub use selector::{Handle, HandlerScope, MenuOptions, MenuState, Phase, RingSelector};
pub use source::Source;

use palette::Srgba;

pub type Color = Srgba<f64>;

pub const fn rgba8(r: u8, g: u8, b: u8, a: u8) -> Color {
    Srgba::new(
        r as f64 / 255.0,
        g as f64 / 255.0,
        b as f64 / 255.0,
        a as f64 / 255.0,
    )
}

pub const REFERENCE_VIEWPORT: Size = Size {
    width: 1920.0,
    height: 1080.0,
};
pub const INNER_RADIUS_DIVISOR: f64 = 8.0; // inner radius = viewport height / 8
pub const OUTER_RADIUS_DIVISOR: f64 = 2.7;
pub const DEFAULT_BG_COLOR: Color = rgba8(50, 50, 50, 150);
pub const DEFAULT_FG_COLOR: Color = rgba8(175, 175, 175, 200);
pub const DEFAULT_LINE_SEP_COLOR: Color = rgba8(50, 50, 50, 125);

/// Ticks per second the host should drive [`RingSelector::tick`] at.
pub const TICK_RATE: u32 = 144;
pub const SECTOR_STEPS: usize = 50;
pub const SEPARATOR_WIDTH: f64 = 1.0;
pub const LABEL_BASELINE_SHIFT: f64 = 4.5;
