pub mod board;
pub mod info;
pub mod play;
