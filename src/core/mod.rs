pub mod actions;
pub mod config;
pub mod session;
pub mod transcript;
pub mod transport;
pub mod tutor;
