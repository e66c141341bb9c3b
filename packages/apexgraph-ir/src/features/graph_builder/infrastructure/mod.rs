pub mod inheritance;
pub mod materializer;
pub mod standard_library;
pub(crate) mod synthesizers;
pub(crate) mod validator;
