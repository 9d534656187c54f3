mod handlers;
mod main_menu;
mod menu_context;

pub use main_menu::show_main_menu;
pub use menu_context::MenuContext;
