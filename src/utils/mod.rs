pub mod errors;
pub mod pagination;
pub mod validation;
