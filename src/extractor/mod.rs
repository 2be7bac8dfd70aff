pub mod page_extractor;

pub use page_extractor::{ExtractedHeading, ExtractedImage, ExtractedLink, PageExtractor};
