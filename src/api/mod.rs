pub mod search;
pub mod server;
