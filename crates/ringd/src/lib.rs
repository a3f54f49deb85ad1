pub mod config;
pub mod events;
pub mod gui;
pub mod menus;
pub mod sys;
