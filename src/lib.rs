pub mod changeset;
pub mod config;
pub mod errors;
pub mod events;
pub mod model;
pub mod notify;
pub mod render;
pub mod server;
pub mod store;
pub mod view;
pub mod ws;
