//! HTTP adapter exposing the point commands

pub mod handlers;
pub mod server;

pub use server::HttpServer;
