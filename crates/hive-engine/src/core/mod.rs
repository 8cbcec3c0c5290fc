pub mod body;
pub mod coords;
pub mod physics;
pub mod scene;
pub mod time;
