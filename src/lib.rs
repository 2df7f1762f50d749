pub mod collection;
pub mod compute;
pub mod config;
pub mod display;
pub mod entities;
pub mod host;
pub mod input;
pub mod spawner;
