pub mod app;
pub mod catalog;
pub mod config;
pub mod diagnostics;
pub mod gallery;
pub mod layout;
pub mod lightbox;
pub mod logging;
pub mod preloader;
pub mod tasks;
pub mod theme;
pub mod ui;
