use crate::config::{self, Config, MenuName};
use crate::events::AppEvent;
use crate::gui::painter::CairoPainter;
use crate::gui::theme::{self, ThemeColors};
use crate::gui::window;
use crate::menus::{HostContext, Menus, TickClock};
use gtk::gdk;
use gtk::prelude::*;
use gtk4 as gtk;
use relm4::prelude::*;
use ringsel::{KeyName, Point, Size};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Instant;

pub struct AppModel {
    pub menus: Rc<RefCell<Menus>>,
    pub host: HostContext,
    pub pointer: Rc<Cell<Point>>,
    pub clock: TickClock,
    pub visible: bool,
    pub root: gtk::ApplicationWindow,
    pub drawing_area: gtk::DrawingArea,
}

#[derive(Debug)]
pub enum AppMsg {
    Show(Option<MenuName>),
    Hide,
    Click(u32),
    CursorMove(Point),
    Key(KeyName),
    Tick,
    ConfigReload,
}

impl From<AppEvent> for AppMsg {
    fn from(event: AppEvent) -> Self {
        match event {
            AppEvent::Show(name) => AppMsg::Show(name),
            AppEvent::Hide => AppMsg::Hide,
            AppEvent::ConfigReload => AppMsg::ConfigReload,
        }
    }
}

fn key_name(key: gdk::Key) -> Option<KeyName> {
    key.to_unicode()
        .filter(|c| !c.is_control())
        .map(|c| KeyName::new(c.to_string()))
        .or_else(|| key.name().map(|n| KeyName::new(n.as_str())))
}

fn build_menus(config: &Config, host: &HostContext) -> Menus {
    let (menus, errors) = Menus::build(config, host);
    for e in errors {
        log::error!("Skipping menu: {}", e);
    }
    menus
}

#[relm4::component(pub)]
impl SimpleComponent for AppModel {
    type Init = (
        Config,
        async_channel::Sender<AppEvent>,
        async_channel::Receiver<AppEvent>,
    );
    type Input = AppMsg;
    type Output = ();

    view! {
        #[root]
        #[name = "window"]
        gtk::ApplicationWindow {
            set_title: Some("ringd"),
            #[watch]
            set_visible: model.visible,
            add_css_class: "ringd-window",
            set_decorated: false,

            add_controller = gtk::EventControllerKey {
                connect_key_pressed[sender] => move |_, key, _, _| {
                    if key == gdk::Key::Escape {
                        sender.input(AppMsg::Hide);
                        return glib::Propagation::Stop;
                    }
                    match key_name(key) {
                        Some(name) => {
                            sender.input(AppMsg::Key(name));
                            glib::Propagation::Stop
                        }
                        None => glib::Propagation::Proceed,
                    }
                }
            },

            #[name = "drawing_area"]
            gtk::DrawingArea {
                set_hexpand: true,
                set_vexpand: true,
                add_css_class: "ringd-drawing-area",

                connect_resize[viewport = model.host.viewport.clone()] => move |_, w, h| {
                    if w > 0 && h > 0 {
                        viewport.set(Size::new(w as f64, h as f64));
                    }
                },

                add_controller = gtk::EventControllerMotion {
                    connect_enter[sender] => move |_, x, y| {
                        sender.input(AppMsg::CursorMove(Point::new(x, y)));
                    },
                    connect_motion[sender] => move |_, x, y| {
                        sender.input(AppMsg::CursorMove(Point::new(x, y)));
                    }
                },

                add_controller = gtk::GestureClick {
                    set_button: 0, // Listen to all buttons
                    connect_released[sender] => move |gesture, _, _, _| {
                        sender.input(AppMsg::Click(gesture.current_button()));
                    }
                }
            }
        }
    }

    fn init(
        init: Self::Init,
        root: Self::Root,
        sender: ComponentSender<Self>,
    ) -> ComponentParts<Self> {
        let (config, tx, rx) = init;

        theme::load_css();
        window::init_layer_shell(&root);

        let host = HostContext::new(tx);
        let menus = build_menus(&config, &host);
        log::info!("Loaded {} menus", menus.len());

        let model = AppModel {
            menus: Rc::new(RefCell::new(menus)),
            host,
            pointer: Rc::new(Cell::new(Point::default())),
            clock: TickClock::new(Instant::now()),
            visible: false,
            root: root.clone(),
            drawing_area: gtk::DrawingArea::default(),
        };

        let widgets = view_output!();

        let mut model = model;
        model.drawing_area = widgets.drawing_area.clone();

        let (menus_draw, pointer_draw) = (model.menus.clone(), model.pointer.clone());
        widgets
            .drawing_area
            .set_draw_func(move |drawing_area, cr, _, _| {
                let colors = ThemeColors::from_context(&drawing_area.style_context());
                let mut menus = menus_draw.borrow_mut();
                let Some(menu) = menus.active_mut() else {
                    return;
                };
                let mut painter = CairoPainter::new(cr, colors.text);
                if let Err(e) = menu.frame(pointer_draw.get(), &mut painter) {
                    log::error!("Drawing error: {}", e);
                }
            });

        let (tick_sender, menus_tick) = (sender.clone(), model.menus.clone());
        glib::timeout_add_local(model.clock.period(), move || {
            if menus_tick.borrow().is_animating() {
                tick_sender.input(AppMsg::Tick);
            }
            glib::ControlFlow::Continue
        });

        let sender_clone = sender.clone();
        relm4::spawn(async move {
            while let Ok(event) = rx.recv().await {
                sender_clone.input(AppMsg::from(event));
            }
        });

        root.set_visible(false);

        ComponentParts { model, widgets }
    }

    fn update(&mut self, msg: Self::Input, _sender: ComponentSender<Self>) {
        match msg {
            AppMsg::Show(name) => {
                if let Some(size) = window::get_viewport(&self.drawing_area) {
                    self.host.viewport.set(size);
                }
                // a hidden layer surface has no pointer; wait for the first event
                let cursor = self
                    .visible
                    .then(|| window::get_cursor_position(&self.root))
                    .flatten();
                self.host.begin_show(cursor);
                if let Some(cursor) = cursor {
                    self.pointer.set(cursor);
                }

                if self.menus.borrow_mut().show(name.as_ref()) {
                    self.clock = TickClock::new(Instant::now());
                    self.visible = true;
                    self.drawing_area.queue_draw();
                }
            }
            AppMsg::Hide => {
                self.menus.borrow_mut().hide();
                self.visible = false;
            }
            AppMsg::Click(btn) => {
                if !self.visible {
                    return;
                }
                if btn == gdk::BUTTON_PRIMARY {
                    self.menus.borrow_mut().click();
                } else if btn == gdk::BUTTON_SECONDARY {
                    self.menus.borrow_mut().hide();
                }
                self.sync_visibility();
            }
            AppMsg::CursorMove(point) => {
                self.pointer.set(point);
                if !self.visible {
                    return;
                }
                let anchored = self.host.track_pointer(point);
                let changed = self
                    .menus
                    .borrow_mut()
                    .active_mut()
                    .is_some_and(|menu| menu.update_hover(point));
                if changed || anchored {
                    self.drawing_area.queue_draw();
                }
            }
            AppMsg::Key(key) => {
                if !self.visible {
                    return;
                }
                self.menus.borrow_mut().key_typed(&key);
                self.sync_visibility();
            }
            AppMsg::Tick => {
                let due = self.clock.due(Instant::now());
                let mut menus = self.menus.borrow_mut();
                let changed = (0..due).fold(false, |changed, _| menus.tick() | changed);
                if changed && self.visible {
                    self.drawing_area.queue_draw();
                }
            }
            AppMsg::ConfigReload => match config::load_config() {
                Ok(new_config) => {
                    let menus = build_menus(&new_config, &self.host);
                    log::info!("Configuration reloaded ({} menus)", menus.len());
                    *self.menus.borrow_mut() = menus;
                    self.visible = false;
                }
                Err(e) => log::error!("Failed to reload config: {}", e),
            },
        }
    }
}

impl AppModel {
    /// Hides the window once the active menu has closed itself.
    fn sync_visibility(&mut self) {
        self.visible = self.menus.borrow().is_showing();
        if self.visible {
            self.drawing_area.queue_draw();
        }
    }
}
