pub mod build;
pub mod init;

pub use build::{build, BuildArgs};
pub use init::{init, InitArgs};
