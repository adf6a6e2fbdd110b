use anyhow::Result;
use clap::{Parser, Subcommand};
use revenue_analytics::config::{self, AnalyticsConfig};
use revenue_analytics::model::PivotedRow;
use revenue_analytics::pivot::PIVOT_COUNTRIES;
use revenue_analytics::RevenueAnalytics;
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "revenue-analytics")]
#[command(about = "Box-office revenue analytics over a movie catalog")]
struct Args {
    /// SQLite catalog (or set ANALYTICS_DB_PATH)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Batch revenue threshold (or set ANALYTICS_REVENUE_THRESHOLD)
    #[arg(long, global = true)]
    threshold: Option<String>,

    /// Print rows as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the catalog schema
    Init,
    /// Import movies from a CSV file
    Import {
        /// title,revenue,release_date,genres,countries
        csv_file: PathBuf,
    },
    /// Total revenue per genre
    Aggregate {
        #[arg(long)]
        country: Option<i64>,
    },
    /// Genre revenue metrics frame
    Metrics {
        #[arg(long)]
        country: Option<i64>,
    },
    /// Running total and revenue rank within a genre
    Trends {
        genre: i64,
    },
    /// Genre x country revenue table
    Pivot {
        #[arg(long)]
        genre: Option<i64>,

        #[arg(long)]
        country: Option<i64>,
    },
    /// Average movie revenue of a genre
    Average {
        genre: i64,
    },
    /// Average revenue for every genre with a movie above the threshold
    Batch,
    /// Show the error log
    Errors,
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let args = Args::parse();
    let mut config = AnalyticsConfig::from_env()?;
    if let Some(db) = args.db.clone() {
        config.database_path = db;
    }
    if let Some(raw) = args.threshold.as_deref() {
        config.revenue_threshold = config::parse_threshold(raw)?;
    }

    let filter = EnvFilter::try_new(&config.log_filter).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut analytics = RevenueAnalytics::open(&config)?;
    info!("Using catalog {}", config.database_path.display());

    match args.command {
        Commands::Init => {
            println!("✅ Catalog ready at {}", config.database_path.display());
        }
        Commands::Import { csv_file } => {
            let summary = analytics.import_movies_csv(&csv_file)?;
            if args.json {
                print_json(&summary)?;
            } else {
                println!(
                    "✅ Imported {} movies ({} new genres, {} new countries)",
                    summary.movies, summary.genres_created, summary.countries_created
                );
            }
        }
        Commands::Aggregate { country } => {
            let rows = analytics.aggregate_revenue_by_genre(country)?;
            if args.json {
                print_json(&rows)?;
            } else {
                print_header("REVENUE BY GENRE");
                for row in &rows {
                    println!("{:<30} {:>18.2}", row.genre, row.total_revenue);
                }
            }
        }
        Commands::Metrics { country } => {
            if args.json {
                print_json(&analytics.aggregate_revenue_by_genre(country)?)?;
            } else {
                let frame = analytics.fetch_genre_revenue_metrics(country)?;
                print_header("GENRE REVENUE METRICS");
                println!("{}", frame);
            }
        }
        Commands::Trends { genre } => {
            let rows = analytics.analyze_genre_trends(genre)?;
            if args.json {
                print_json(&rows)?;
            } else {
                print_header("GENRE TRENDS");
                println!("{:>5}  {:<40} {:>16} {:>18}", "rank", "title", "revenue", "cumulative");
                for row in &rows {
                    println!(
                        "{:>5}  {:<40} {:>16.2} {:>18.2}",
                        row.rank, row.title, row.revenue, row.cumulative_revenue
                    );
                }
            }
        }
        Commands::Pivot { genre, country } => {
            let rows = analytics.pivot_revenue_by_genre_and_country(genre, country)?;
            if args.json {
                print_json(&rows)?;
            } else {
                print_header("REVENUE BY GENRE AND COUNTRY");
                print_pivot(&rows);
            }
        }
        Commands::Average { genre } => {
            let average = analytics.average_revenue(genre)?;
            if args.json {
                print_json(&average)?;
            } else {
                match average {
                    Some(avg) => println!("{:.2}", avg),
                    None => println!("n/a"),
                }
            }
        }
        Commands::Batch => {
            let mut stdout = std::io::stdout();
            let report = analytics.run_genre_batch(&mut stdout);
            if args.json {
                print_json(&report)?;
            } else if report.failed > 0 || report.aborted {
                println!(
                    "⚠️  {} of {} genres failed, see `revenue-analytics errors`",
                    report.failed, report.eligible
                );
            }
        }
        Commands::Errors => {
            let entries = analytics.error_log()?;
            if args.json {
                print_json(&entries)?;
            } else {
                print_header("ERROR LOG");
                for entry in &entries {
                    println!(
                        "#{:<5} {}  sev={} state={}  {}",
                        entry.id, entry.logged_at, entry.severity, entry.state, entry.message
                    );
                }
            }
        }
    }

    Ok(())
}

fn print_header(title: &str) {
    println!("{}", "=".repeat(80));
    println!(" {}", title);
    println!("{}", "=".repeat(80));
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_pivot(rows: &[PivotedRow]) {
    print!("{:<20}", "genre");
    for country in PIVOT_COUNTRIES {
        print!(" {:>26}", country);
    }
    println!();
    for row in rows {
        print!("{:<20}", row.genre);
        for cell in &row.revenue {
            match cell {
                Some(value) => print!(" {:>26.2}", value),
                None => print!(" {:>26}", "NULL"),
            }
        }
        println!();
    }
}
