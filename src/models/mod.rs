pub mod ring_average;
pub mod sample;
