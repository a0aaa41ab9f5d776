pub mod picture;
pub mod stats;
pub mod word;

pub use picture::save_picture;
pub use stats::stats;
pub use word::save_word;
