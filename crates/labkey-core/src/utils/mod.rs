pub mod error_helpers;
pub mod retry;
pub mod template;
pub mod validation;
