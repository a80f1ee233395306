pub mod api;
pub mod config;
pub mod entities;
pub mod error;
pub mod external;
pub mod format;
pub mod resolver;
pub mod server;
pub mod widget;

#[cfg(test)]
mod testing;
