pub mod audio;
pub mod config;
pub mod engine;
pub mod note;
pub mod song;
mod util;
pub mod voicebank;
