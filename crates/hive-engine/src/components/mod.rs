pub mod character;
pub mod entity;
pub mod health;
pub mod interact;
pub mod motion;
