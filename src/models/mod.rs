pub mod analysis;
pub mod component;
pub mod pattern;
pub mod quality;
pub mod recommendation;
pub mod relationship;
