pub mod api;
pub mod cli;
pub mod database_ops;
pub mod logging;
pub mod normalization;
pub mod present;
pub mod query;

pub mod util {
    pub mod env;
}
