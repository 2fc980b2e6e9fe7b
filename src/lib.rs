pub mod bot;
pub mod config;
pub mod fanout;
pub mod i18n;
pub mod store;
pub mod telegram;
pub mod translation;
