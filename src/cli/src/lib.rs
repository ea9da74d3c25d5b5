pub mod args;
pub mod event;
pub mod input;
pub mod run;
pub mod settings;
