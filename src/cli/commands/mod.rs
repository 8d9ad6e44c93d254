mod config;
mod run;
mod status;
mod upload;

pub use config::{ConfigCommand, handle_config};
pub use run::{RunArgs, handle_run};
pub use status::handle_status;
pub use upload::{UploadArgs, handle_upload};
