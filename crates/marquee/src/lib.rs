pub mod app;
pub mod command;
pub mod config;
pub mod events;
pub mod scene;
pub mod sys;
