use anyhow::Result;

pub mod config;
pub mod diagnose;
pub mod web;

pub use config::ConfigCommand;
pub use diagnose::DiagnoseCommand;
pub use web::WebCommand;

#[allow(async_fn_in_trait)]
pub trait Command {
    async fn execute(&self) -> Result<()>;
}
