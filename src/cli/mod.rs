pub mod convert;
pub mod currencies;
pub mod history;
pub mod setup;
pub mod theme;
pub mod ui;
