use super::*;

mod io_render;
mod settings;

pub(in crate::cli) use io_render::*;
pub(in crate::cli) use settings::*;
