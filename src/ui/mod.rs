mod app;
mod forms;
mod helpers;
mod terminal;
mod theme;

pub use app::App;
pub use terminal::run_app;
