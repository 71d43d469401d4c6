pub mod init;
pub mod progress;
pub mod score;
pub mod validate;
