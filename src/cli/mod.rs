pub mod args;

pub use args::{Cli, Commands, ProgressMode, RenderFormat, render_formats};
