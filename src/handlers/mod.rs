pub mod analyze;
pub mod prompt;
pub mod response_parser;
pub mod validator;

pub use analyze::AnalyzeHandler;
