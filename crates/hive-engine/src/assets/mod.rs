pub mod level;
pub mod save;
