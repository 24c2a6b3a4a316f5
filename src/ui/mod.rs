//! Ratatui front-end: the event loop, the take/return form, the passphrase
//! prompt, and the admin report. Rendering reads state only; every store
//! call goes through `inventory`.

mod app;
mod forms;
mod helpers;
mod screens;
mod terminal;

pub use app::App;
pub use terminal::run_app;
