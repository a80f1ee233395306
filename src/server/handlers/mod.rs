pub mod routes;
pub mod styles;
