pub mod config;
pub mod convert;
pub mod llm;
pub mod session;
pub mod sql;
pub mod util;
pub mod web;
