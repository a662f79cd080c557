pub mod exchangerate_api;
pub mod ipapi;
