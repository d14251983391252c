pub mod daemon;
pub mod handle;
pub mod scan;
pub mod watch;
