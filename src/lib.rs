pub mod api;
pub mod config;
pub mod controller;
pub mod data_models;
pub mod error;
pub mod provider;
pub mod terminal;
pub mod view;

pub use controller::ResultsController;
pub use error::{Error, Result};
