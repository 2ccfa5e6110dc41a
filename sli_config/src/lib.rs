pub mod error;
pub mod parser;
pub mod source;

pub use error::{ConfigError, Result, SourceError};
pub use parser::{ParsedSlis, SkippedSli, SliParser};
pub use source::{parse_document, ConfigFormat, SliSource};
