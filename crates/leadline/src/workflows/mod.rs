pub mod contacts;
pub mod distribution;
pub mod quality;
