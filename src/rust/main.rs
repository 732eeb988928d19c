use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use complaint_triage::{
    train_from_path, ArtifactManager, ComplaintRepository, ComplaintStatus, ComplaintSummary,
    CorpusConfig, CsvComplaintRepository, IntakeService, LogNotifier, TrainingConfig,
    TriagePipeline,
};
use log::info;

const DEFAULT_LOG: &str = "complaints_log.csv";

#[derive(Parser)]
#[command(author, version, about = "Complaint categorization and urgency triage", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct ArtifactArgs {
    /// Vectorizer artifact path (requires --model)
    #[arg(long)]
    vectorizer: Option<PathBuf>,
    /// Model artifact path (requires --vectorizer)
    #[arg(long)]
    model: Option<PathBuf>,
}

impl ArtifactArgs {
    /// Explicit paths when both are given, the default location when neither
    /// is. Nothing is created here; saving creates missing directories.
    fn resolve(self) -> Result<(PathBuf, PathBuf)> {
        match (self.vectorizer, self.model) {
            (Some(vectorizer), Some(model)) => Ok((vectorizer, model)),
            (None, None) => Ok(ArtifactManager::default_pair_paths()),
            _ => bail!("--vectorizer and --model must be given together"),
        }
    }

    fn load_pipeline(self) -> Result<TriagePipeline> {
        let (vectorizer, model) = self.resolve()?;
        TriagePipeline::from_artifacts(&vectorizer, &model)
            .context("Could not load the artifact pair; run `train` first")
    }
}

#[derive(Args)]
struct LogArgs {
    /// Complaint log CSV file
    #[arg(long, default_value = DEFAULT_LOG)]
    log: PathBuf,
}

#[derive(Subcommand)]
enum Command {
    /// Train the category classifier from a labeled CSV corpus
    Train {
        corpus: PathBuf,
        #[command(flatten)]
        artifacts: ArtifactArgs,
        /// Accept a corpus with a single distinct category
        #[arg(long)]
        allow_single_class: bool,
        #[arg(long, default_value = "Complaint")]
        text_column: String,
        #[arg(long, default_value = "Category")]
        label_column: String,
    },
    /// Print the category and urgency of a complaint
    Triage {
        text: String,
        #[command(flatten)]
        artifacts: ArtifactArgs,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Triage a complaint and append it to the complaint log
    Submit {
        #[arg(long)]
        user: String,
        text: String,
        #[command(flatten)]
        artifacts: ArtifactArgs,
        #[command(flatten)]
        log: LogArgs,
    },
    /// List logged complaints
    List {
        /// Only show complaints filed by this user
        #[arg(long)]
        user: Option<String>,
        #[command(flatten)]
        log: LogArgs,
    },
    /// Change the status of a logged complaint
    SetStatus {
        id: u64,
        /// Pending, "In Progress" or Solved
        status: ComplaintStatus,
        #[command(flatten)]
        log: LogArgs,
    },
    /// Summarize the complaint log
    Stats {
        #[command(flatten)]
        log: LogArgs,
    },
}

fn main() -> Result<()> {
    complaint_triage::init_logger();
    let cli = Cli::parse();

    match cli.command {
        Command::Train {
            corpus,
            artifacts,
            allow_single_class,
            text_column,
            label_column,
        } => {
            let (vectorizer, model) = artifacts.resolve()?;
            let training = TrainingConfig {
                allow_single_class,
                ..TrainingConfig::default()
            };
            let corpus_config = CorpusConfig {
                text_column,
                label_column,
                ..CorpusConfig::default()
            };

            let start_time = Instant::now();
            let (classifier, pair_id) =
                train_from_path(&corpus, &vectorizer, &model, &training, &corpus_config)
                    .with_context(|| format!("Training on {} failed", corpus.display()))?;
            info!("Training took {:.2?}", start_time.elapsed());

            let stats = classifier.info();
            println!(
                "Trained {} categories over {} documents ({} terms)",
                stats.num_classes, stats.training_documents, stats.vocabulary_size
            );
            println!("Vectorizer: {}", vectorizer.display());
            println!("Model:      {}", model.display());
            println!("Pair id:    {}", pair_id);
        }
        Command::Triage {
            text,
            artifacts,
            json,
        } => {
            let pipeline = artifacts.load_pipeline()?;
            let result = pipeline.triage(&text);
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("Category: {}", result.category);
                println!("Urgency:  {}", result.urgency);
            }
        }
        Command::Submit {
            user,
            text,
            artifacts,
            log,
        } => {
            let service = IntakeService::new(
                artifacts.load_pipeline()?,
                CsvComplaintRepository::new(&log.log),
                LogNotifier,
            );
            let submission = service.submit(&user, &text)?;
            let record = submission.record;
            println!("Complaint #{} submitted", record.id);
            println!("Category: {}", record.category);
            println!("Urgency:  {}", record.urgency);
            println!("Notification: {:?}", submission.notification);
        }
        Command::List { user, log } => {
            let records = CsvComplaintRepository::new(&log.log).load_all()?;
            for record in records
                .iter()
                .filter(|record| user.as_deref().map_or(true, |u| record.username == u))
            {
                println!(
                    "#{:<4} {:<12} {:<14} {:<7} {:<12} {}",
                    record.id,
                    record.username,
                    record.category,
                    record.urgency,
                    record.status,
                    record.complaint
                );
            }
        }
        Command::SetStatus { id, status, log } => {
            let record = CsvComplaintRepository::new(&log.log).update_by_id(id, status)?;
            println!("Complaint #{} is now {}", record.id, record.status);
        }
        Command::Stats { log } => {
            let records = CsvComplaintRepository::new(&log.log).load_all()?;
            let summary = ComplaintSummary::from_records(&records);
            println!("Total complaints: {}", summary.total);
            println!("By category:");
            for (category, count) in &summary.by_category {
                println!("  {}: {}", category, count);
            }
            println!("By status:");
            for (status, count) in &summary.by_status {
                println!("  {}: {}", status, count);
            }
            println!("By urgency:");
            for (urgency, count) in &summary.by_urgency {
                println!("  {}: {}", urgency, count);
            }
            println!("High urgency:");
            for record in &summary.high_urgency {
                println!("  #{} [{}] {}", record.id, record.status, record.complaint);
            }
        }
    }

    Ok(())
}
