pub mod env_utils;
pub mod error_utils;
pub mod result_utils;
pub mod version;
