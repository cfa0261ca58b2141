//! SmartQ CLI - command-line front end for the SmartQ daemon

mod output;
mod rpc;
mod watch;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use serde_json::{json, Map, Value};
use tabled::Table;

use output::{bytes_to_mb, QueueRow, StatsRow, TicketRow};
use rpc::RpcClient;

const DEFAULT_RPC_URL: &str = "http://127.0.0.1:9527";
const DEFAULT_WS_URL: &str = "ws://127.0.0.1:9528";

#[derive(Parser)]
#[command(name = "smartq-cli")]
#[command(about = "SmartQ virtual waiting line CLI", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// JSON-RPC server URL
    #[arg(long, global = true, env = "SMARTQ_RPC_URL", default_value = DEFAULT_RPC_URL)]
    rpc_url: String,

    /// WebSocket gateway URL
    #[arg(long, global = true, env = "SMARTQ_WS_URL", default_value = DEFAULT_WS_URL)]
    ws_url: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage queues
    #[command(subcommand)]
    Queue(QueueCommand),

    /// Take a number in a queue
    Issue {
        queue_id: String,

        /// 0 (normal) to 100
        #[arg(short, long, default_value = "0")]
        priority: i32,
    },

    /// Show a ticket and its place in line
    Status { ticket_id: String },

    /// Call the next ticket to a service point
    CallNext {
        queue_id: String,

        /// Service point taking the ticket
        #[arg(short, long)]
        agent: String,
    },

    /// Mark a serving ticket as served
    Complete { ticket_id: String },

    /// Cancel a waiting or serving ticket
    Cancel { ticket_id: String },

    /// Mark a called ticket as a no-show
    NoShow { ticket_id: String },

    /// Show per-queue counts and daemon status
    Stats { queue_id: Option<String> },

    /// Purge old tickets and compact the database
    Maintenance {
        /// Force VACUUM even if not needed
        #[arg(long)]
        force_vacuum: bool,

        /// Override the configured retention for finished tickets
        #[arg(long)]
        retention_days: Option<i64>,
    },

    /// Follow live events for a queue or a ticket
    Watch(WatchArgs),
}

#[derive(Subcommand)]
enum QueueCommand {
    /// Create a queue
    Create {
        #[arg(long)]
        name: String,

        /// Letters shown before ticket numbers (e.g. "A" gives A-1)
        #[arg(long)]
        prefix: String,

        /// Average minutes spent per ticket
        #[arg(long)]
        avg: u32,

        #[arg(long)]
        description: Option<String>,
    },

    /// List queues
    List {
        /// Include inactive queues
        #[arg(long)]
        all: bool,
    },

    /// Show a queue with its serving and waiting tickets
    Show { queue_id: String },

    /// Change queue settings
    Update {
        queue_id: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        description: Option<String>,

        #[arg(long)]
        prefix: Option<String>,

        #[arg(long)]
        avg: Option<u32>,

        /// Open (true) or close (false) the queue to new tickets
        #[arg(long)]
        active: Option<bool>,
    },

    /// Delete a queue that has no active tickets
    Delete { queue_id: String },
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct WatchArgs {
    #[arg(long)]
    queue: Option<String>,

    #[arg(long)]
    ticket: Option<String>,
}

impl WatchArgs {
    fn into_target(self) -> Option<watch::Target> {
        match (self.queue, self.ticket) {
            (Some(queue), _) => Some(watch::Target::Queue(queue)),
            (None, Some(ticket)) => Some(watch::Target::Ticket(ticket)),
            (None, None) => None,
        }
    }
}

/// Named params for `queue.update.v1`, leaving unset fields out
fn update_params(
    queue_id: String,
    name: Option<String>,
    description: Option<String>,
    prefix: Option<String>,
    avg: Option<u32>,
    active: Option<bool>,
) -> Value {
    let mut params = Map::new();
    params.insert("queueId".into(), json!(queue_id));
    let fields = [
        ("name", name.map(Value::from)),
        ("description", description.map(Value::from)),
        ("ticketPrefix", prefix.map(Value::from)),
        ("avgServiceMinutes", avg.map(Value::from)),
        ("isActive", active.map(Value::from)),
    ];
    for (key, value) in fields {
        if let Some(value) = value {
            params.insert(key.into(), value);
        }
    }
    Value::Object(params)
}

fn print_ticket(title: &str, ticket: Value) -> Result<()> {
    let row: TicketRow = serde_json::from_value(ticket)?;
    println!("{}", title.green().bold());
    println!();
    println!("{}", Table::new(vec![row]));
    Ok(())
}

async fn run_queue(client: &RpcClient, command: QueueCommand) -> Result<()> {
    match command {
        QueueCommand::Create {
            name,
            prefix,
            avg,
            description,
        } => {
            let params = json!({
                "name": name,
                "description": description,
                "ticketPrefix": prefix,
                "avgServiceMinutes": avg,
            });
            let queue: QueueRow = client.call_as("queue.create.v1", params).await?;
            println!("{}", "✓ Queue created".green().bold());
            println!();
            println!("{}", Table::new(vec![queue]));
        }

        QueueCommand::List { all } => {
            let result = client
                .call("queue.list.v1", json!({ "includeInactive": all }))
                .await?;
            let queues: Vec<QueueRow> = serde_json::from_value(result["queues"].clone())?;
            if queues.is_empty() {
                println!("{}", "No queues".yellow());
            } else {
                println!("{}", Table::new(queues));
            }
        }

        QueueCommand::Show { queue_id } => {
            let result = client
                .call("queue.get.v1", json!({ "queueId": queue_id }))
                .await?;
            let queue: QueueRow = serde_json::from_value(result["queue"].clone())?;
            let tickets: Vec<TicketRow> = serde_json::from_value(result["tickets"].clone())?;

            println!("{}", format!("Queue {}", queue.name).cyan().bold());
            println!(
                "  {} {}   {} {}",
                "Waiting:".bold(),
                result["waiting"],
                "Serving:".bold(),
                result["serving"]
            );
            println!();
            println!("{}", Table::new(vec![queue]));
            if !tickets.is_empty() {
                println!();
                println!("{}", Table::new(tickets));
            }
        }

        QueueCommand::Update {
            queue_id,
            name,
            description,
            prefix,
            avg,
            active,
        } => {
            let params = update_params(queue_id, name, description, prefix, avg, active);
            let queue: QueueRow = client.call_as("queue.update.v1", params).await?;
            println!("{}", "✓ Queue updated".green().bold());
            println!();
            println!("{}", Table::new(vec![queue]));
        }

        QueueCommand::Delete { queue_id } => {
            client
                .call("queue.delete.v1", json!({ "queueId": queue_id }))
                .await?;
            println!("{}", format!("✓ Queue {} deleted", queue_id).green().bold());
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let client = RpcClient::new(cli.rpc_url.clone());

    match cli.command {
        Commands::Queue(command) => run_queue(&client, command).await?,

        Commands::Issue { queue_id, priority } => {
            let ticket = client
                .call(
                    "ticket.issue.v1",
                    json!({ "queueId": queue_id, "priority": priority }),
                )
                .await?;
            print_ticket("✓ Ticket issued", ticket)?;
        }

        Commands::Status { ticket_id } => {
            let view = client
                .call("ticket.status.v1", json!({ "ticketId": ticket_id }))
                .await?;
            let position = view["position"].as_i64().unwrap_or(0);
            print_ticket("Ticket status", view)?;
            if position > 0 {
                println!();
                println!("  {} {}", "Position in line:".bold(), position);
            }
        }

        Commands::CallNext { queue_id, agent } => {
            let result = client
                .call(
                    "ticket.call_next.v1",
                    json!({ "queueId": queue_id, "agentId": agent }),
                )
                .await?;
            match result.get("ticket").filter(|t| !t.is_null()) {
                Some(ticket) => print_ticket("✓ Now serving", ticket.clone())?,
                None => println!("{}", "Nobody is waiting".yellow()),
            }
        }

        Commands::Complete { ticket_id } => {
            let ticket = client
                .call("ticket.complete.v1", json!({ "ticketId": ticket_id }))
                .await?;
            print_ticket("✓ Ticket served", ticket)?;
        }

        Commands::Cancel { ticket_id } => {
            let ticket = client
                .call("ticket.cancel.v1", json!({ "ticketId": ticket_id }))
                .await?;
            print_ticket("✓ Ticket cancelled", ticket)?;
        }

        Commands::NoShow { ticket_id } => {
            let ticket = client
                .call("ticket.no_show.v1", json!({ "ticketId": ticket_id }))
                .await?;
            print_ticket("✓ Ticket marked as no-show", ticket)?;
        }

        Commands::Stats { queue_id } => {
            println!("{}", "System Status".cyan().bold());
            println!();

            match client
                .call("admin.stats.v1", json!({ "queueId": queue_id }))
                .await
            {
                Ok(stats) => {
                    println!("  {} {}", "RPC URL:".bold(), client.url());
                    println!("  {} {}", "Status:".bold(), "ONLINE".green());
                    println!(
                        "  {} {}",
                        "Live connections:".bold(),
                        stats["liveConnections"]
                    );
                    let db_mb = bytes_to_mb(stats["dbSizeBytes"].as_i64().unwrap_or(0));
                    println!("  {} {:.2} MB", "DB Size:".bold(), db_mb);
                    println!("  {} {} seconds", "Uptime:".bold(), stats["uptimeSeconds"]);
                    println!();

                    let rows: Vec<StatsRow> = serde_json::from_value(stats["queues"].clone())?;
                    if !rows.is_empty() {
                        println!("{}", Table::new(rows));
                    }
                }
                Err(e) => {
                    println!("  {} {}", "Status:".bold(), "ERROR".red());
                    println!("  {} {}", "Error:".bold(), e);
                }
            }
        }

        Commands::Maintenance {
            force_vacuum,
            retention_days,
        } => {
            println!("{}", "Running maintenance...".cyan().bold());
            println!();

            if force_vacuum {
                println!("  {} Force VACUUM enabled", "•".bold());
            }

            let params = json!({
                "forceVacuum": force_vacuum,
                "retentionDays": retention_days,
            });

            match client.call("admin.maintenance.v1", params).await {
                Ok(result) => {
                    println!("  ✓ Maintenance completed");
                    println!();
                    if result["vacuumRun"].as_bool().unwrap_or(false) {
                        println!("  {} VACUUM executed", "✓".green());
                    } else {
                        println!("  ○ VACUUM skipped (not needed)");
                    }
                    println!(
                        "  {} {} tickets deleted",
                        "✓".green(),
                        result["ticketsDeleted"]
                    );
                    println!();
                    let before = bytes_to_mb(result["dbSizeBefore"].as_i64().unwrap_or(0));
                    let after = bytes_to_mb(result["dbSizeAfter"].as_i64().unwrap_or(0));
                    println!("  {} {:.2} MB → {:.2} MB", "DB Size:".bold(), before, after);
                }
                Err(e) => {
                    println!("  {} Maintenance failed: {}", "✗".red(), e);
                }
            }
        }

        Commands::Watch(args) => {
            if let Some(target) = args.into_target() {
                watch::run(&cli.ws_url, target).await?;
            }
        }
    }

    Ok(())
}
