pub mod config;
pub mod event;
pub mod instruments;
pub mod midi;
pub mod tone;
pub mod track;
