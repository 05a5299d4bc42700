use clap::Args;
use course_signup::catalog::CourseCatalog;
use course_signup::config::AppConfig;
use course_signup::error::AppError;
use serde_json::json;
use std::path::PathBuf;

#[derive(Args, Debug, Default)]
pub(crate) struct CatalogArgs {
    /// Catalog file to inspect (defaults to the configured path)
    #[arg(long)]
    pub(crate) catalog: Option<PathBuf>,
    /// Narrow the listing to one subject's topics
    #[arg(long)]
    pub(crate) subject: Option<String>,
    /// Narrow the listing to one topic's timeslots
    #[arg(long, requires = "subject")]
    pub(crate) topic: Option<String>,
}

/// Print the option lists the form collaborator would receive, as JSON.
pub(crate) fn run_catalog_listing(args: CatalogArgs) -> Result<(), AppError> {
    let path = match args.catalog {
        Some(path) => path,
        None => AppConfig::load()?.catalog.path,
    };
    let catalog = CourseCatalog::load(&path)?;

    let listing = match (&args.subject, &args.topic) {
        (Some(subject), Some(topic)) => json!({
            "subject": subject,
            "topic": topic,
            "timeslots": catalog.timeslots(subject, topic),
        }),
        (Some(subject), None) => json!({
            "subject": subject,
            "topics": catalog.topics(subject),
        }),
        _ => json!({ "subjects": catalog.subjects() }),
    };

    println!("{listing:#}");
    Ok(())
}
