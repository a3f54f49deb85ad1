use crate::config::{
    self, Anchor, Config, ConfigError, ItemEntry, ItemTable, MenuConfig, MenuName, SETUP_COMMAND,
};
use crate::events::AppEvent;
use async_channel::Sender;
use ringsel::{
    Handle, Handler, HandlerScope, ItemRecord, ItemSpec, KeyName, Label, MenuItem, MenuOptions,
    Phase, Point, RingSelector, Size, Source, TICK_RATE,
};
use std::cell::Cell;
use std::process::{Command, Stdio};
use std::rc::Rc;
use std::thread;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq)]
pub enum ItemAction {
    Exec(Vec<String>),
    Open(MenuName),
    Setup,
    Echo,
}

impl ItemAction {
    pub fn from_table(menu: &MenuName, table: &ItemTable) -> Result<Self, ConfigError> {
        let item = table.name.clone().unwrap_or_default();

        if let Some(target) = &table.open {
            return Ok(Self::Open(target.clone()));
        }

        match table.exec.as_deref() {
            None => Ok(Self::Echo),
            Some(SETUP_COMMAND) => Ok(Self::Setup),
            Some(line) => {
                let argv = shell_words::split(line).map_err(|source| ConfigError::Command {
                    menu: menu.clone(),
                    item: item.clone(),
                    source,
                })?;
                if argv.is_empty() {
                    return Err(ConfigError::EmptyCommand {
                        menu: menu.clone(),
                        item,
                    });
                }
                Ok(Self::Exec(argv))
            }
        }
    }
}

/// Host state that menu suppliers read on every frame.
#[derive(Debug, Clone)]
pub struct HostContext {
    pub tx: Sender<AppEvent>,
    pub viewport: Rc<Cell<Size>>,
    pub anchor: Rc<Cell<Point>>,
    // set while a shown menu waits for the first pointer position
    anchor_pending: Rc<Cell<bool>>,
}

impl HostContext {
    pub fn new(tx: Sender<AppEvent>) -> Self {
        Self {
            tx,
            viewport: Rc::new(Cell::new(Size::default())),
            anchor: Rc::new(Cell::new(Point::default())),
            anchor_pending: Rc::new(Cell::new(false)),
        }
    }

    /// Pins cursor-anchored menus to `cursor`. Without a known position they
    /// sit at the viewport center until [`Self::track_pointer`] reports one.
    pub fn begin_show(&self, cursor: Option<Point>) {
        match cursor {
            Some(point) => self.anchor.set(point),
            None => self.anchor.set(self.viewport.get().center()),
        }
        self.anchor_pending.set(cursor.is_none());
    }

    /// Returns true when this pointer sample became the anchor.
    pub fn track_pointer(&self, pointer: Point) -> bool {
        let pending = self.anchor_pending.replace(false);
        if pending {
            self.anchor.set(pointer);
        }
        pending
    }

    pub fn anchor_pending(&self) -> bool {
        self.anchor_pending.get()
    }

    fn viewport_source(&self) -> Source<Size> {
        let viewport = self.viewport.clone();
        Source::dynamic(move || viewport.get())
    }

    fn anchor_source(&self) -> (Source<f64>, Source<f64>) {
        let (ax, ay) = (self.anchor.clone(), self.anchor.clone());
        (
            Source::dynamic(move || ax.get().x),
            Source::dynamic(move || ay.get().y),
        )
    }
}

fn label(text: &str, color: Option<config::HexColor>, scale: Option<f64>) -> Label {
    let mut label = Label::new(text);
    if let Some(color) = color {
        label = label.with_color(color.0);
    }
    if let Some(scale) = scale {
        label = label.with_scale(scale);
    }
    label
}

fn item_spec(cfg: &MenuConfig, entry: &ItemEntry) -> Result<ItemSpec<ItemAction>, ConfigError> {
    let table = match entry {
        ItemEntry::Label(text) => return Ok(ItemSpec::Label(label(text, cfg.text_color, None))),
        ItemEntry::Invalid(found) => return Ok(ItemSpec::Invalid(found.clone())),
        ItemEntry::Record(table) => table,
    };

    Ok(ItemSpec::Record(ItemRecord {
        name: table
            .name
            .as_deref()
            .map(|name| label(name, table.text_color.or(cfg.text_color), table.text_scale)),
        width: table.width,
        key: table.key.clone(),
        inner_radius: table.inner_radius.map(Source::Fixed),
        outer_radius: table.outer_radius.map(Source::Fixed),
        bg_color: table.bg_color.map(|c| c.0),
        fg_color: table.fg_color.map(|c| c.0),
        handler: None,
        payload: Some(ItemAction::from_table(&cfg.name, table)?),
    }))
}

pub fn build_menu(
    cfg: &MenuConfig,
    host: &HostContext,
) -> Result<RingSelector<ItemAction>, ConfigError> {
    let items = cfg
        .items
        .iter()
        .map(|entry| item_spec(cfg, entry))
        .collect::<Result<Vec<_>, _>>()?;

    let tx = host.tx.clone();
    let options = MenuOptions {
        center: (cfg.anchor == Anchor::Cursor).then(|| host.anchor_source()),
        inner_radius: cfg.inner_radius.map(Source::Fixed),
        outer_radius: cfg.outer_radius.map(Source::Fixed),
        rot_offset: cfg.rot_offset,
        clockwise: cfg.clockwise,
        bg_color: cfg.bg_color.map(|c| c.0),
        fg_color: cfg.fg_color.map(|c| c.0),
        line_sep_color: cfg.line_sep_color.map(|c| c.0),
        handler: Some(Handler::new(move |item, handle| run_action(item, handle, &tx))),
        viewport: host.viewport_source(),
        ..MenuOptions::new(items)
    };

    RingSelector::new(options).map_err(|source| ConfigError::Menu {
        menu: cfg.name.clone(),
        source,
    })
}

/// Default handler of every configured menu: close, then act on the payload.
pub fn run_action(item: &MenuItem<ItemAction>, handle: &mut Handle<'_>, tx: &Sender<AppEvent>) {
    handle.close();

    match item.payload() {
        Some(ItemAction::Exec(argv)) => {
            if let Err(e) = spawn(argv) {
                log::error!("Failed to run '{}': {}", shell_words::join(argv), e);
            }
        }
        Some(ItemAction::Open(name)) => {
            if let Err(e) = tx.try_send(AppEvent::Show(Some(name.clone()))) {
                log::error!("Failed to open menu '{}': {}", name, e);
            }
        }
        Some(ItemAction::Setup) => match config::write_default_config() {
            Ok(path) => {
                if let Err(e) = Command::new("xdg-open").arg(&path).spawn() {
                    log::error!("Failed to open {}: {}", path.display(), e);
                }
            }
            Err(e) => log::error!("Failed to write default config: {}", e),
        },
        Some(ItemAction::Echo) | None => println!("Selected item: {}", item.label()),
    }
}

/// Starts `argv` and reaps it from a detached thread once it exits.
fn spawn(argv: &[String]) -> std::io::Result<thread::JoinHandle<()>> {
    let (program, args) = argv
        .split_first()
        .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty command"))?;
    let mut child = Command::new(program)
        .args(args)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;

    let program = program.clone();
    thread::Builder::new()
        .name("ringd-reaper".to_string())
        .spawn(move || match child.wait() {
            Ok(status) if !status.success() => log::warn!("'{}' exited with {}", program, status),
            Ok(_) => {}
            Err(e) => log::error!("Failed to wait for '{}': {}", program, e),
        })
}

/// Turns elapsed wall-clock time into whole ticks at [`TICK_RATE`], so the
/// easing speed does not depend on the timer's granularity.
#[derive(Debug, Clone, Copy)]
pub struct TickClock {
    period: Duration,
    last: Instant,
}

impl TickClock {
    pub const MAX_CATCH_UP: u32 = 4;

    pub fn new(now: Instant) -> Self {
        Self {
            period: Duration::from_secs_f64(1.0 / TICK_RATE as f64),
            last: now,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn due(&mut self, now: Instant) -> u32 {
        let elapsed = now.saturating_duration_since(self.last);
        let ticks = elapsed.as_nanos() / self.period.as_nanos();
        if ticks > Self::MAX_CATCH_UP as u128 {
            self.last = now;
            return Self::MAX_CATCH_UP;
        }
        let ticks = ticks as u32;
        self.last += self.period * ticks;
        ticks
    }
}

pub struct Menus {
    entries: Vec<(MenuName, RingSelector<ItemAction>)>,
    default: Option<MenuName>,
    active: Option<usize>,
}

impl Menus {
    /// Builds every menu it can; failures are returned alongside, not fatal.
    pub fn build(config: &Config, host: &HostContext) -> (Self, Vec<ConfigError>) {
        let mut entries: Vec<(MenuName, RingSelector<ItemAction>)> = Vec::new();
        let mut errors = Vec::new();

        for cfg in &config.menus {
            if entries.iter().any(|(name, _)| name == &cfg.name) {
                log::warn!("Duplicate menu '{}' ignored", cfg.name);
                continue;
            }
            match build_menu(cfg, host) {
                Ok(menu) => entries.push((cfg.name.clone(), menu)),
                Err(e) => errors.push(e),
            }
        }

        let menus = Self {
            entries,
            default: config.default_menu_name().cloned(),
            active: None,
        };
        (menus, errors)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &MenuName> {
        self.entries.iter().map(|(name, _)| name)
    }

    pub fn get(&self, name: &MenuName) -> Option<&RingSelector<ItemAction>> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, m)| m)
    }

    /// Opens `name` (or the default menu) and closes any other. Returns false
    /// when no such menu exists.
    pub fn show(&mut self, name: Option<&MenuName>) -> bool {
        let Some(target) = name.or(self.default.as_ref()) else {
            return false;
        };
        let Some(index) = self.entries.iter().position(|(n, _)| n == target) else {
            log::warn!("No menu named '{}'", target);
            return false;
        };

        for (i, (_, menu)) in self.entries.iter_mut().enumerate() {
            if i == index {
                menu.open();
            } else {
                menu.close();
            }
        }
        self.active = Some(index);
        true
    }

    pub fn hide(&mut self) {
        for (_, menu) in &mut self.entries {
            menu.close();
        }
        self.active = None;
    }

    pub fn active(&self) -> Option<&RingSelector<ItemAction>> {
        self.active.and_then(|i| self.entries.get(i)).map(|(_, m)| m)
    }

    pub fn active_mut(&mut self) -> Option<&mut RingSelector<ItemAction>> {
        self.active
            .and_then(|i| self.entries.get_mut(i))
            .map(|(_, m)| m)
    }

    pub fn is_showing(&self) -> bool {
        self.active().is_some_and(RingSelector::is_open)
    }

    /// True while any menu is open or still easing back after a close.
    pub fn is_animating(&self) -> bool {
        self.entries
            .iter()
            .any(|(_, menu)| menu.phase() != Phase::Closed)
    }

    pub fn tick(&mut self) -> bool {
        self.entries
            .iter_mut()
            .fold(false, |changed, (_, menu)| menu.tick() | changed)
    }

    pub fn click(&mut self) -> Option<HandlerScope> {
        self.active_mut()?.click()
    }

    pub fn key_typed(&mut self, key: &KeyName) -> bool {
        self.entries
            .iter_mut()
            .fold(false, |hit, (_, menu)| menu.key_typed(key).is_some() | hit)
    }
}
