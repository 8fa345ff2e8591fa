pub mod cli;
pub mod config;
pub mod error;
pub mod merge;
pub mod normalize;
pub mod pipeline;
pub mod places;
pub mod store;
pub mod testimonial;
