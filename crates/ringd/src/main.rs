use clap::{Parser, Subcommand};
use relm4::prelude::*;
use ringd::config::{self, MenuName};
use ringd::events::AppEvent;
use ringd::gui::app::AppModel;
use ringd::sys::{client, runtime};

#[derive(Parser, Debug)]
#[command(name = "ringd", version, about, long_about = None)]
struct Cli {
    /// Runs the overlay daemon when no command is given.
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone)]
enum Commands {
    /// Show a menu, or the default menu
    Show { menu: Option<String> },
    /// Hide the open menu
    Hide,
    /// Reload the configuration file
    Reload,
}

impl From<Commands> for AppEvent {
    fn from(command: Commands) -> Self {
        match command {
            Commands::Show { menu } => AppEvent::Show(menu.map(MenuName::new)),
            Commands::Hide => AppEvent::Hide,
            Commands::Reload => AppEvent::ConfigReload,
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Some(command) => client::send_command(&AppEvent::from(command)),
        None => run_daemon(),
    }
}

fn run_daemon() -> anyhow::Result<()> {
    let config = config::load_or_setup();

    let (tx, rx) = async_channel::bounded(32);

    // Start Background Services
    runtime::start_background_services(tx.clone())?;

    let app = RelmApp::new("org.ringsel.ringd");
    app.run::<AppModel>((config, tx, rx));
    Ok(())
}
