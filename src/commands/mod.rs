pub mod download;
pub mod preprocess;

pub use download::download_reference;
pub use preprocess::preprocess;
