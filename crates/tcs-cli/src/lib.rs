pub mod cases;
pub mod library;
pub mod logging;
pub mod settings;
