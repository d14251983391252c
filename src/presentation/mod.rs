pub mod cli;
pub mod request;
