#![warn(missing_docs)]
//! # snapscribe binary
//!
//! Command-line shell over the analyze workflow: signs in with a static
//! token, shows the quota, uploads one image and prints the description.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use snapscribe_app::{
    AnalyzeWorkflow, WorkflowConfig, app_version, init_tracing, load_selected_file,
};
use snapscribe_client::HttpBackend;
use snapscribe_session::{BearerToken, GuardAction, Navigator, StaticIdentity};
use snapscribe_ui::ViewModel;

#[derive(Debug, Parser)]
#[command(name = "snapscribe", version = app_version(), about = "Describe an image with the snapscribe backend")]
struct Cli {
    /// Image to analyze.
    #[arg(required_unless_present = "usage_only")]
    image: Option<PathBuf>,

    /// Bearer token for the backend.
    #[arg(long, env = "SNAPSCRIBE_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Only print the current quota.
    #[arg(long)]
    usage_only: bool,
}

/// Prints the redirect target instead of navigating.
struct ConsoleNavigator;

impl Navigator for ConsoleNavigator {
    fn replace(&self, route: &str) {
        eprintln!("not signed in; sign in at {route}");
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(error) = init_tracing() {
        eprintln!("{error}");
        return ExitCode::FAILURE;
    }

    match run(cli).await {
        Ok(code) => code,
        Err(message) => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode, String> {
    let config = WorkflowConfig::from_env().map_err(|error| error.to_string())?;
    let backend = HttpBackend::new(config.api_base_url.as_str(), config.request_timeout)
        .map_err(|error| error.to_string())?;
    let token = cli
        .token
        .as_deref()
        .filter(|raw| !raw.trim().is_empty())
        .map(BearerToken::new)
        .transpose()
        .map_err(|error| error.to_string())?;

    let workflow = AnalyzeWorkflow::new(
        Arc::new(StaticIdentity::new(token)),
        Arc::new(backend),
        Arc::new(ConsoleNavigator),
        config.entry_route,
    );

    if let GuardAction::Redirect(_) = workflow.sync_session().await {
        return Ok(ExitCode::FAILURE);
    }
    print_usage(&workflow.view());

    let Some(image) = cli.image.filter(|_| !cli.usage_only) else {
        return Ok(exit_code(&workflow.view()));
    };

    let file = load_selected_file(&image)
        .await
        .map_err(|error| error.to_string())?;
    workflow.select_file(Some(file));
    for hint in workflow.view().selection_hints {
        eprintln!("note: {hint}");
    }

    if workflow.view().limit_reached {
        print_limit(&workflow.view());
        return Ok(ExitCode::FAILURE);
    }

    let outcome = workflow.analyze().await;
    let view = workflow.view();
    print_usage(&view);
    match outcome {
        Ok(_) => {
            println!("{}", view.result_text);
            Ok(ExitCode::SUCCESS)
        }
        Err(_) => {
            print_limit(&view);
            Ok(exit_code(&view))
        }
    }
}

fn print_usage(view: &ViewModel) {
    match view.tier_badge {
        Some(badge) => println!("[{badge}] {}", view.usage_label),
        None => println!("{}", view.usage_label),
    }
}

fn print_limit(view: &ViewModel) {
    if let Some(notice) = &view.limit_notice {
        eprintln!("{}: {}", notice.title, notice.body);
    }
}

fn exit_code(view: &ViewModel) -> ExitCode {
    match &view.error_banner {
        Some(banner) => {
            eprintln!("error: {banner}");
            ExitCode::FAILURE
        }
        None => ExitCode::SUCCESS,
    }
}
