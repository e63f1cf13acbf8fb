//! Container runtime adapters

mod docker;

pub(crate) use docker::last_stderr_line;
pub use docker::DockerRuntime;
