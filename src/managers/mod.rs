pub mod coordinator;
pub mod logging;
