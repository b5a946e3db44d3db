use clap::Subcommand;
use colored::*;
use sentinel_db::DbState;
use sentinel_tools::{Supervisor, Tool};

use super::utils::{compact_json, format_date, new_table, truncate};

#[derive(Subcommand)]
pub enum ToolsCommands {
    /// List tools, optionally only those used by a run or project
    List {
        #[arg(long, conflicts_with = "project")]
        run: Option<String>,
        #[arg(long)]
        project: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum SupervisorsCommands {
    /// List supervisors, optionally only those attached to a tool
    List {
        #[arg(long)]
        tool: Option<String>,
    },
}

pub async fn handle_tools_command(
    db: &DbState,
    command: ToolsCommands,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        ToolsCommands::List { run, project } => {
            let tools = match (run, project) {
                (Some(run_id), _) => db.tool_storage.list_run_tools(&run_id).await?,
                (None, Some(project_id)) => db.tool_storage.list_project_tools(&project_id).await?,
                (None, None) => db.tool_storage.list_tools().await?,
            };
            print_tools(&tools);
            Ok(())
        }
    }
}

pub async fn handle_supervisors_command(
    db: &DbState,
    command: SupervisorsCommands,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        SupervisorsCommands::List { tool } => {
            let supervisors = match tool {
                Some(tool_id) => db.tool_storage.list_tool_supervisors(&tool_id).await?,
                None => db.tool_storage.list_supervisors().await?,
            };
            print_supervisors(&supervisors);
            Ok(())
        }
    }
}

fn print_tools(tools: &[Tool]) {
    if tools.is_empty() {
        println!("{}", "No tools found".yellow());
        return;
    }

    let mut table = new_table(vec!["ID", "Name", "Description", "Attributes", "Created"]);
    for tool in tools {
        table.add_row(vec![
            tool.id.clone(),
            tool.name.clone(),
            truncate(&tool.description, 40),
            compact_json(&tool.attributes, 40),
            format_date(&tool.created_at),
        ]);
    }

    println!("{}", table);
    println!("Total: {} tools", tools.len().to_string().cyan());
}

fn print_supervisors(supervisors: &[Supervisor]) {
    if supervisors.is_empty() {
        println!("{}", "No supervisors found".yellow());
        return;
    }

    let mut table = new_table(vec!["ID", "Type", "Description", "Code", "Created"]);
    for supervisor in supervisors {
        table.add_row(vec![
            supervisor.id.clone(),
            supervisor.supervisor_type.as_str().to_string(),
            truncate(&supervisor.description, 30),
            truncate(&supervisor.code, 40),
            format_date(&supervisor.created_at),
        ]);
    }

    println!("{}", table);
    println!("Total: {} supervisors", supervisors.len().to_string().cyan());
}
