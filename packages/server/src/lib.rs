pub mod anti_cheat;
pub mod auth;
pub mod clock;
pub mod config;
pub mod database;
pub mod entity;
pub mod error;
pub mod judge;
pub mod rounds;
pub mod state;
pub mod store;
