#![deny(warnings)]
pub mod count;
pub mod detection;
pub mod model;
pub mod recognizer;
pub mod session;
