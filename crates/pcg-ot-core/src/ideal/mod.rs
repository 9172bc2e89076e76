//! Ideal functionalities for testing and composition.

pub mod cot;
