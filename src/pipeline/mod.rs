pub mod bank;
pub mod color;
pub mod grid;
pub mod project;
