pub(crate) mod blur;
pub mod command;
pub mod cpu;
pub mod scene;
pub mod surface;
pub mod text;
pub mod wrap;
