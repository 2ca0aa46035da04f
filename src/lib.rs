pub mod backend;
pub mod cli;
pub mod config;
pub mod notify;
pub mod orchestrator;
pub mod poll;
pub mod richtext;
pub mod state;
pub mod util;
pub mod workbook;
