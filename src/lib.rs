pub mod ascii;
pub mod cli;
pub mod error;
pub mod pacing;
pub mod pipeline;
pub mod terminal;
pub mod video;
