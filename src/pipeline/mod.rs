pub mod aggregate;
pub mod compare;
pub mod score;
pub mod variance;
