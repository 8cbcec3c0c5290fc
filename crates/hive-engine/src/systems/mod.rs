pub mod character;
pub mod damage;
pub mod debug;
pub mod interact;
pub mod motion;
pub mod platformer;
