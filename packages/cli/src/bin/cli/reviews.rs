use clap::{Subcommand, ValueEnum};
use colored::*;
use sentinel_db::DbState;
use sentinel_reviews::{ReviewFilter, ReviewStatusKind};

use super::utils::{compact_json, format_date, new_table, truncate};

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum StatusArg {
    Pending,
    Assigned,
    Completed,
    Timeout,
    Failed,
}

impl From<StatusArg> for ReviewStatusKind {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::Pending => ReviewStatusKind::Pending,
            StatusArg::Assigned => ReviewStatusKind::Assigned,
            StatusArg::Completed => ReviewStatusKind::Completed,
            StatusArg::Timeout => ReviewStatusKind::Timeout,
            StatusArg::Failed => ReviewStatusKind::Failed,
        }
    }
}

#[derive(Subcommand)]
pub enum ReviewsCommands {
    /// List review requests, newest first
    List {
        /// Only reviews of this run
        #[arg(long)]
        run: Option<String>,
        /// Only reviews whose current status matches
        #[arg(long, value_enum)]
        status: Option<StatusArg>,
        #[arg(long, default_value = "50")]
        limit: i64,
        #[arg(long, default_value = "0")]
        offset: i64,
    },
    /// Show a review request with its tool calls and decisions
    Show {
        /// Review request ID
        id: String,
    },
    /// Show the full status history of a review request
    History {
        /// Review request ID
        id: String,
    },
}

pub async fn handle_reviews_command(
    db: &DbState,
    command: ReviewsCommands,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        ReviewsCommands::List {
            run,
            status,
            limit,
            offset,
        } => {
            let filter = ReviewFilter {
                run_id: run,
                status: status.map(Into::into),
                limit: Some(limit),
                offset: Some(offset),
            };
            list_reviews(db, &filter).await
        }
        ReviewsCommands::Show { id } => show_review(db, &id).await,
        ReviewsCommands::History { id } => show_history(db, &id).await,
    }
}

async fn list_reviews(db: &DbState, filter: &ReviewFilter) -> Result<(), Box<dyn std::error::Error>> {
    let reviews = db.review_storage.list_reviews(filter).await?;
    let total = db.review_storage.count_reviews(filter).await?;

    if reviews.is_empty() {
        println!("{}", "No review requests found".yellow());
        return Ok(());
    }

    let mut table = new_table(vec!["ID", "Run", "Status", "Task state", "Created"]);
    for review in &reviews {
        table.add_row(vec![
            review.id.clone(),
            review.run_id.clone(),
            review
                .status
                .as_ref()
                .map(|s| s.status.as_str())
                .unwrap_or("-")
                .to_string(),
            compact_json(&review.task_state, 40),
            format_date(&review.created_at),
        ]);
    }

    println!("{}", table);
    println!(
        "Showing {} of {} review requests",
        reviews.len().to_string().cyan(),
        total.to_string().cyan()
    );
    Ok(())
}

async fn show_review(db: &DbState, id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let review = match db.review_storage.get_review(id).await? {
        Some(review) => review,
        None => {
            println!("{} {}", "Review request not found:".red(), id);
            return Ok(());
        }
    };

    println!("{}", format!("Review request {}", review.id).blue().bold());
    println!("  Run:     {}", review.run_id);
    if let Some(status) = &review.status {
        println!(
            "  Status:  {} (since {})",
            status_label(status.status),
            format_date(&status.created_at)
        );
    }
    println!("  Created: {}", format_date(&review.created_at));
    println!("  Task state: {}", serde_json::to_string_pretty(&review.task_state)?);
    println!();

    let tool_requests = db.review_storage.list_review_tool_requests(id).await?;
    let messages = db.review_storage.list_review_messages(id).await?;

    let mut table = new_table(vec!["#", "Tool", "Arguments", "Message"]);
    for (request, message) in tool_requests.iter().zip(&messages) {
        let tool_name = match db.tool_storage.get_tool(&request.tool_id).await? {
            Some(tool) => tool.name,
            None => request.tool_id.clone(),
        };
        table.add_row(vec![
            request.position.to_string(),
            tool_name,
            compact_json(&request.arguments, 40),
            truncate(&message.content, 50),
        ]);
    }
    println!("{}", "Tool calls".bold());
    println!("{}", table);

    let results = db.review_storage.list_review_results(id).await?;
    if results.is_empty() {
        println!("{}", "No decisions recorded".dimmed());
        return Ok(());
    }

    let mut table = new_table(vec!["#", "Decision", "Reasoning", "Recorded"]);
    for result in &results {
        table.add_row(vec![
            result.tool_request.position.to_string(),
            result.decision.as_str().to_string(),
            truncate(&result.reasoning, 50),
            format_date(&result.created_at),
        ]);
    }
    println!("{}", "Decisions".bold());
    println!("{}", table);

    Ok(())
}

async fn show_history(db: &DbState, id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let history = db.review_storage.status_history(id).await?;

    if history.is_empty() {
        println!("{} {}", "No status history for review request".yellow(), id);
        return Ok(());
    }

    let mut table = new_table(vec!["Status", "At", "Entry ID"]);
    for entry in &history {
        table.add_row(vec![
            entry.status.as_str().to_string(),
            format_date(&entry.created_at),
            entry.id.clone(),
        ]);
    }
    println!("{}", table);

    let current = db.review_storage.current_status(id).await?;
    println!("Current status: {}", status_label(current.status));
    Ok(())
}

fn status_label(status: ReviewStatusKind) -> ColoredString {
    match status {
        ReviewStatusKind::Pending | ReviewStatusKind::Assigned => status.as_str().yellow(),
        ReviewStatusKind::Completed => status.as_str().green(),
        ReviewStatusKind::Timeout | ReviewStatusKind::Failed => status.as_str().red(),
    }
}
