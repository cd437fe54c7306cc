pub mod logging;

pub use logging::{clip, truncate_text};
