pub mod app;
pub mod face;
pub mod tray;
pub mod ui;
