use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use scholar_bot::agents::DEFAULT_INSTRUCTION;
use scholar_bot::analysis::write_bar_chart;
use scholar_bot::{Config, Pipeline, SessionState, StageOutcome};

#[derive(Parser)]
#[command(name = "scholar-bot", version, about = "Research pipeline: literature, hypotheses, data analysis and paper writing")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Search, analyze and synthesize hypotheses for a topic
    Research {
        topic: String,
        /// Raw candidates to request from the search service
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Clean, describe and interpret a dataset
    Analyze {
        #[command(flatten)]
        source: DatasetSource,
        /// Topic used for synthetic data
        #[arg(long)]
        topic: Option<String>,
        /// Write a bar chart of the numeric columns to this PNG
        #[arg(long)]
        chart: Option<PathBuf>,
    },
    /// Run research (and optional analysis), then write the paper as PDF
    Paper {
        topic: String,
        #[arg(long)]
        csv: Option<PathBuf>,
        #[arg(long, default_value = "Final_Research_Paper.pdf")]
        output: PathBuf,
    },
    /// Critique and rewrite a draft
    Edit {
        #[command(flatten)]
        draft: DraftSource,
        #[arg(long, default_value = DEFAULT_INSTRUCTION)]
        instruction: String,
        #[arg(long, default_value = "Editor_Feedback.md")]
        output: PathBuf,
    },
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct DatasetSource {
    /// CSV file with a header row
    #[arg(long)]
    csv: Option<PathBuf>,
    /// Ask the model for a synthetic dataset
    #[arg(long)]
    synthetic: bool,
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct DraftSource {
    #[arg(long)]
    text: Option<String>,
    /// pdf, txt or md file
    #[arg(long)]
    file: Option<PathBuf>,
}

fn report<T>(stage: &str, outcome: &StageOutcome<T>) {
    if let Some(reason) = outcome.reason() {
        warn!(stage, reason = %reason, "Stage degraded");
    }
}

fn print_research(session: &SessionState) {
    println!("# Research Dashboard: {}\n", session.topic);
    for (i, row) in session.knowledge_base.dashboard_rows().iter().enumerate() {
        println!("{}. {} ({}) - {} citations", i + 1, row.title, row.year, row.citations);
    }
    for (i, record) in session.knowledge_base.records.iter().enumerate() {
        println!("\n## {}. {}", i + 1, record.title);
        if !record.concepts.is_empty() {
            println!("Concepts: {}", record.concepts.join(", "));
        }
        if let Some(link) = record.preferred_link() {
            println!("Link: {}", link);
        }
        println!("\n### Summary\n{}", record.summary);
        println!("\n### Methodology\n{}", record.methodology);
        println!("\n### Analysis\n{}", record.analysis);
        println!("\n### Hypothesis\n{}", record.hypothesis);
    }
    if let Some(hypotheses) = &session.global_hypotheses {
        println!("\n# Top Ranked Global Hypotheses\n\n{}", hypotheses.text);
    }
}

fn print_analysis(session: &SessionState) {
    if let Some(dataset) = &session.dataset {
        println!("# Dataset preview\n{}", dataset.headers.join(","));
        for row in dataset.head(5) {
            let cells: Vec<&str> = row.iter().map(|c| c.as_deref().unwrap_or("")).collect();
            println!("{}", cells.join(","));
        }
    }
    if let Some(report) = &session.analyst_report {
        println!("\n# Descriptive statistics\n{}", report.statistics.render());
        println!("\n# Statistical narrative\n{}", report.ai_insight);
    }
}

async fn run_analysis(
    pipeline: &Pipeline,
    session: &mut SessionState,
    csv: Option<PathBuf>,
) -> anyhow::Result<()> {
    match csv {
        Some(path) => pipeline
            .load_dataset(session, &path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => report("synthetic data", &pipeline.generate_synthetic_dataset(session).await),
    }
    if session.dataset.is_none() {
        bail!("No dataset available to analyze");
    }
    report("analyst", &pipeline.run_analyst(session).await);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "scholar_bot=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let mut config = Config::from_env()?;
    if let Command::Research { limit: Some(limit), .. } = &cli.command {
        config.pipeline.search_limit = *limit;
    }

    let pipeline = Pipeline::from_config(&config);
    let mut session = SessionState::new();
    info!(run_id = %session.run_id, "Session started");

    match cli.command {
        Command::Research { topic, .. } => {
            let outcome = pipeline
                .start_research(&mut session, &topic, |p| {
                    info!(completed = p.completed, total = p.total, "Analysis progress {:.0}%", p.fraction() * 100.0)
                })
                .await;
            report("research", &outcome);
            print_research(&session);
        }
        Command::Analyze { source, topic, chart } => {
            if source.synthetic {
                match topic {
                    Some(topic) => session.topic = topic,
                    None => bail!("--synthetic requires --topic"),
                }
            }
            run_analysis(&pipeline, &mut session, source.csv).await?;
            print_analysis(&session);

            if let (Some(path), Some(analyst_report)) = (chart, &session.analyst_report) {
                if write_bar_chart(&path, &analyst_report.cleaned_data)? {
                    println!("\nChart written to {}", path.display());
                } else {
                    println!("\nNo numeric data columns found for visualization.");
                }
            }
        }
        Command::Paper { topic, csv, output } => {
            let outcome = pipeline.start_research(&mut session, &topic, |_| {}).await;
            report("research", &outcome);
            if csv.is_some() {
                run_analysis(&pipeline, &mut session, csv).await?;
            }
            report("writer", &pipeline.write_paper(&mut session).await);

            let bytes = pipeline.render_paper(&session)?;
            std::fs::write(&output, bytes)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            if let Some(paper) = &session.paper {
                println!("Paper written by {} to {}", paper.model, output.display());
            }
        }
        Command::Edit { draft, instruction, output } => {
            let outcome = match (draft.text, draft.file) {
                (Some(text), _) => pipeline.edit_draft(&mut session, &text, &instruction).await,
                (None, Some(path)) => {
                    let bytes = std::fs::read(&path)
                        .with_context(|| format!("Failed to read {}", path.display()))?;
                    let filename = path.to_string_lossy();
                    pipeline.edit_upload(&mut session, &filename, &bytes, &instruction).await?
                }
                (None, None) => bail!("Provide --text or --file"),
            };
            report("editor", &outcome);
            let feedback = session.editor_response.unwrap_or_default();
            println!("{}", feedback);
            std::fs::write(&output, &feedback)
                .with_context(|| format!("Failed to write {}", output.display()))?;
        }
    }

    Ok(())
}
