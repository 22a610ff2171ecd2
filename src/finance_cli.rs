// src/finance_cli.rs
// Command-line front end for the finance API

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use finance_api::budgets::models::BudgetQuery;
use finance_api::client::ApiClient;
use finance_api::common::TransactionType;
use finance_api::transactions::models::{
    CreateTransactionRequest, DateRangeQuery, TransactionQuery,
};

#[derive(Debug, Parser)]
#[command(name = "finance-cli")]
#[command(about = "Command-line client for the personal finance API", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[arg(long, global = true, env = "FINANCE_BASE_URL", default_value = "http://localhost:3000")]
    base_url: String,

    #[arg(long, global = true, env = "FINANCE_EMAIL")]
    email: Option<String>,

    #[arg(long, global = true, env = "FINANCE_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Log in as the shared demo account; credentials are ignored.
    #[arg(long, global = true)]
    demo: bool,

    /// Print raw JSON instead of text.
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Debug, Clone, Args)]
struct RangeArgs {
    /// RFC 3339 timestamp or YYYY-MM-DD
    #[arg(long)]
    start_date: Option<String>,

    /// RFC 3339 timestamp or YYYY-MM-DD
    #[arg(long)]
    end_date: Option<String>,
}

impl From<RangeArgs> for DateRangeQuery {
    fn from(args: RangeArgs) -> Self {
        DateRangeQuery {
            start_date: args.start_date,
            end_date: args.end_date,
        }
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Income, expense and balance totals
    Summary(RangeArgs),
    /// Weekly income/expense buckets (both dates required)
    Chart(RangeArgs),
    /// Budgets with spent and remaining amounts
    Budgets {
        #[arg(long)]
        month: Option<i64>,
        #[arg(long)]
        year: Option<i64>,
    },
    Categories,
    Transactions {
        #[arg(long = "type")]
        kind: Option<TransactionType>,
        #[arg(long)]
        category_id: Option<String>,
        #[command(flatten)]
        range: RangeArgs,
        #[arg(long)]
        limit: Option<i64>,
        #[arg(long)]
        offset: Option<i64>,
    },
    AddTransaction {
        #[arg(long)]
        amount: Decimal,
        #[arg(long = "type")]
        kind: TransactionType,
        #[arg(long)]
        description: Option<String>,
        /// Defaults to now
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        category_id: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let client = ApiClient::new(&cli.base_url)?;

    sign_in(&client, &cli).await?;

    match cli.command {
        Command::Summary(range) => {
            let summary = client.summary(&range.into()).await?;
            if cli.json {
                return print_json(&summary);
            }
            println!("Income:  {}", summary.total_income);
            println!("Expense: {}", summary.total_expense);
            println!("Balance: {}", summary.balance);
        }
        Command::Chart(range) => {
            let points = client.chart_data(&range.into()).await?;
            if cli.json {
                return print_json(&points);
            }
            for point in points {
                println!(
                    "{:<8} +{:<12} -{}",
                    point.name,
                    point.income.to_string(),
                    point.expense
                );
            }
        }
        Command::Budgets { month, year } => {
            let budgets = client.list_budgets(&BudgetQuery { month, year }).await?;
            if cli.json {
                return print_json(&budgets);
            }
            for budget in budgets {
                let category = budget
                    .category
                    .as_ref()
                    .map(|c| c.name.as_str())
                    .unwrap_or("-");
                println!(
                    "{:04}-{:02} {:<20} amount {:<10} spent {:<10} remaining {}",
                    budget.year,
                    budget.month,
                    category,
                    budget.amount.to_string(),
                    budget.spent.to_string(),
                    budget.remaining
                );
            }
        }
        Command::Categories => {
            let categories = client.list_categories().await?;
            if cli.json {
                return print_json(&categories);
            }
            for category in categories {
                println!("{}  {:<8} {}", category.id, category.kind.as_str(), category.name);
            }
        }
        Command::Transactions {
            kind,
            category_id,
            range,
            limit,
            offset,
        } => {
            let query = TransactionQuery {
                kind,
                category_id,
                date: None,
                start_date: range.start_date,
                end_date: range.end_date,
                limit,
                offset,
            };
            let page = client.list_transactions(&query).await?;
            if cli.json {
                return print_json(&page);
            }
            for tx in &page.data {
                let category = tx.category.as_ref().map(|c| c.name.as_str()).unwrap_or("-");
                println!(
                    "{}  {:<8} {:>10}  {:<16} {}",
                    &tx.date[..10.min(tx.date.len())],
                    tx.kind.as_str(),
                    tx.amount.to_string(),
                    category,
                    tx.description.as_deref().unwrap_or("")
                );
            }
            println!(
                "Showing {} of {} (offset {})",
                page.data.len(),
                page.total,
                page.offset
            );
        }
        Command::AddTransaction {
            amount,
            kind,
            description,
            date,
            category_id,
        } => {
            let created = client
                .create_transaction(&CreateTransactionRequest {
                    amount,
                    kind,
                    description,
                    date,
                    category_id,
                })
                .await?;
            if cli.json {
                return print_json(&created);
            }
            println!("Created transaction {}", created.id);
        }
    }

    Ok(())
}

async fn sign_in(client: &ApiClient, cli: &Cli) -> anyhow::Result<()> {
    if cli.demo {
        client.demo_login().await.context("demo login failed")?;
        return Ok(());
    }

    match (&cli.email, &cli.password) {
        (Some(email), Some(password)) => {
            client
                .login(email, password)
                .await
                .context("login failed")?;
            Ok(())
        }
        _ => bail!("pass --email and --password, or --demo"),
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
