pub mod analyzer;
pub mod extractor;
pub mod markup;
pub mod recommend;
pub mod registry;
pub mod relationships;
pub mod scorer;
pub mod similarity;
pub mod styles;
