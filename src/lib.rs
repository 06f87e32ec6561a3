// Library exports for the GGame client
// The binary and the integration tests both build on these modules

pub mod api;
pub mod comments;
pub mod config;
pub mod datefmt;
pub mod error;
pub mod feed;
pub mod models;
pub mod pages;
pub mod poller;
pub mod session;
pub mod widgets;
