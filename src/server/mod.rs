mod response;
mod tools;

pub use tools::{ForgeDocs, SECTION_URI_PREFIX, section_uri};
