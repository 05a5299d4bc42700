mod catalog_cli;
mod cli;
mod infra;
mod routes;
mod server;

use course_signup::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
