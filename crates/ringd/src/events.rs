use crate::config::MenuName;

#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    Show(Option<MenuName>),
    Hide,
    ConfigReload,
}

impl AppEvent {
    /// Parses one line of the control protocol (`show [menu]`, `hide`, `reload`).
    pub fn parse(line: &str) -> Option<Self> {
        let mut words = line.split_whitespace();
        let event = match words.next()? {
            "show" => AppEvent::Show(words.next().map(MenuName::from)),
            "hide" => AppEvent::Hide,
            "reload" => AppEvent::ConfigReload,
            _ => return None,
        };
        words.next().is_none().then_some(event)
    }

    pub fn to_line(&self) -> String {
        match self {
            AppEvent::Show(Some(name)) => format!("show {}", name),
            AppEvent::Show(None) => "show".to_string(),
            AppEvent::Hide => "hide".to_string(),
            AppEvent::ConfigReload => "reload".to_string(),
        }
    }
}
