#![warn(clippy::pedantic)]
pub mod arena;
pub mod builder;
pub mod errors;
pub mod json;
pub mod nodes;
