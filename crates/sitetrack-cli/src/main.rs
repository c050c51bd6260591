use std::sync::Arc;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use sitetrack_api::ApiClient;
use sitetrack_client::{ClientContexts, Screen, SessionStatus};
use sitetrack_store::{create_store, StoreConfig};
use tracing::info;

/// Developer smoke tool for the sitetrack client core: exercises the
/// selection contexts and API client against a live server.
#[derive(Debug, Parser)]
#[command(name = "sitetrack", about = "Sitetrack client state tool")]
struct Cli {
    /// Server URL
    #[arg(long, env = "SITETRACK_SERVER_URL", default_value = "http://127.0.0.1:4600")]
    server_url: String,

    /// Bearer token; stored in the session context when given
    #[arg(long, env = "SITETRACK_TOKEN")]
    token: Option<String>,

    /// Snapshot directory (defaults to the user data dir)
    #[arg(long, env = "SITETRACK_DATA_DIR")]
    data_dir: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List projects visible to the current session
    Projects,
    /// Select a project and print its phase cards
    Select { project_id: String },
    /// Print the persisted selection state
    Dashboard,
    /// Check whether the stored session is still accepted
    Validate,
    /// Drop the session and reset the selection graph
    Logout,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let store = create_store(&StoreConfig {
        data_dir: cli.data_dir,
        ephemeral: false,
    });
    let api = Arc::new(ApiClient::new(&cli.server_url));
    let ctx = ClientContexts::load(store, api).await;

    if let Some(token) = cli.token {
        ctx.login(token).await;
        info!("token stored in session context");
    }

    match cli.command {
        Command::Projects => {
            if !ctx.session.is_authenticated() {
                bail!("no session token; pass --token or set SITETRACK_TOKEN");
            }
            for project in ctx.api().list_projects().await? {
                println!("{}  {}", project.id, project.name);
            }
        }
        Command::Select { project_id } => {
            let projects = ctx.api().list_projects().await?;
            let Some(project) = projects.into_iter().find(|p| p.id == project_id) else {
                bail!("unknown project: {project_id}");
            };
            ctx.select_project(&project).await?;
            for step in ctx.project.step_types() {
                let marker = match ctx.project.selected_step_id().as_deref() {
                    Some(id) if id == step.step_id => "*",
                    _ => " ",
                };
                println!(
                    "{marker} {:<20} {:>4} done, {:>3} this week",
                    step.name, step.completed_count, step.last_week_count
                );
            }
        }
        Command::Dashboard => {
            println!("project: {:?}", ctx.project.selected_project_id());
            println!(
                "step:    {:?} / {:?}",
                ctx.project.selected_step_type(),
                ctx.project.selected_step_id()
            );
            if let Some(id) = ctx.project.selected_step_id() {
                if let Some(step) = ctx.project.step_type_by_id(&id) {
                    let next = match sitetrack_client::next_screen_for_step(&step) {
                        Screen::TaskList => "task list",
                        Screen::DrillDown => "drill-down",
                    };
                    println!("next:    {next}");
                }
            }
            let loc = ctx.location.current_location();
            println!(
                "where:   {:?} > {:?} > {:?}",
                loc.building_name, loc.level_name, loc.unit_name
            );
            println!("drafts:  {} design form(s)", ctx.forms.forms().len());
        }
        Command::Validate => match ctx.check_session().await {
            SessionStatus::Valid => println!("session ok"),
            SessionStatus::Warning(msg) => println!("session warning: {msg}"),
        },
        Command::Logout => {
            ctx.logout().await;
            println!("logged out; selection state cleared");
        }
    }

    Ok(())
}
