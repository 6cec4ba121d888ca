pub mod api;
pub mod config;
pub mod controller;
pub mod error;
pub mod poll;
pub mod retry;
pub mod state;
pub mod view;

pub use controller::GameController;
