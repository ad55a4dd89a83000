// ChiloDisco - ui/panels/mod.rs

pub mod controls;
pub mod log_panel;
