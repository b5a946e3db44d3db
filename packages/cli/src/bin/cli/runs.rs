use clap::Subcommand;
use colored::*;
use sentinel_db::DbState;

use super::utils::{format_date, new_table};

#[derive(Subcommand)]
pub enum RunsCommands {
    /// List the runs of a project
    List {
        /// Project ID
        project_id: String,
    },
}

pub async fn handle_runs_command(
    db: &DbState,
    command: RunsCommands,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        RunsCommands::List { project_id } => list_runs(db, &project_id).await,
    }
}

async fn list_runs(db: &DbState, project_id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let project = match db.project_storage.get_project(project_id).await? {
        Some(project) => project,
        None => {
            println!("{} {}", "Project not found:".red(), project_id);
            return Ok(());
        }
    };

    let runs = db.project_storage.list_runs(project_id).await?;
    println!("{}", format!("Runs of {}", project.name).blue().bold());

    if runs.is_empty() {
        println!("{}", "No runs recorded".yellow());
        return Ok(());
    }

    let mut table = new_table(vec!["ID", "Created"]);
    for run in &runs {
        table.add_row(vec![run.id.clone(), format_date(&run.created_at)]);
    }

    println!("{}", table);
    println!("Total: {} runs", runs.len().to_string().cyan());
    Ok(())
}
