use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use rust_match_predictor::api_client::MatchApiClient;
use rust_match_predictor::config::Config;
use rust_match_predictor::errors::{ClientError, ResultExt};
use rust_match_predictor::history::PredictionHistory;
use rust_match_predictor::models::{PredictionResult, Subject};
use rust_match_predictor::notes::NotesCache;
use rust_match_predictor::predictor::SinglePairPredictor;
use rust_match_predictor::ranker::{MultiCandidateRanker, RequestMode};
use rust_match_predictor::ranking::map_score_to_label;
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(version, about = "Compatibility predictions and notes from the command line")]
struct Cli {
    /// Overrides MATCH_API_URL for this run.
    #[arg(long, global = true)]
    api_url: Option<String>,
    /// Print results as JSON instead of text.
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Checks that the service answers.
    Health,
    /// Scores one pair of names.
    Predict {
        #[arg(long)]
        primary: String,
        #[arg(long)]
        secondary: String,
        #[arg(long)]
        primary_age: Option<u32>,
        #[arg(long)]
        primary_dob: Option<NaiveDate>,
        #[arg(long)]
        secondary_age: Option<u32>,
        #[arg(long)]
        secondary_dob: Option<NaiveDate>,
        /// Also map the score onto the configured labels.
        #[arg(long)]
        labeled: bool,
    },
    /// Scores one name against several candidates and ranks them.
    Rank {
        #[arg(long)]
        me: String,
        #[arg(long)]
        age: Option<u32>,
        #[arg(long)]
        dob: Option<NaiveDate>,
        /// Issue all requests at once instead of one by one.
        #[arg(long)]
        concurrent: bool,
        candidates: Vec<String>,
    },
    /// Maps a score onto a label list without contacting the service.
    Label {
        #[arg(allow_negative_numbers = true)]
        score: i64,
        /// Label to use; repeat for several. Defaults to MATCH_LABELS.
        #[arg(long = "label")]
        labels: Vec<String>,
    },
    /// Lists stored predictions.
    History {
        /// Sort by score, highest first.
        #[arg(long)]
        ranked: bool,
    },
    /// Deletes a stored prediction.
    DeletePrediction { id: i64 },
    /// Works with notes.
    Notes {
        #[command(subcommand)]
        command: NotesCommand,
    },
}

#[derive(Subcommand, Debug)]
enum NotesCommand {
    List,
    Add { text: String },
    Delete { id: i64 },
}

fn subject(name: String, age: Option<u32>, dob: Option<NaiveDate>) -> Subject {
    Subject {
        name,
        age,
        date_of_birth: dob,
    }
}

fn print_result(result: &PredictionResult) {
    println!(
        "{} & {}: {}%",
        result.primary_name, result.secondary_name, result.score
    );
}

fn render_json<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(value)
}

/// Prints `value` as JSON when `json` is set, otherwise runs the text printer.
fn emit<T: Serialize + ?Sized>(json: bool, value: &T, text: impl FnOnce(&T)) {
    if !json {
        text(value);
        return;
    }
    match render_json(value) {
        Ok(rendered) => println!("{}", rendered),
        Err(e) => {
            tracing::error!("Failed to serialize output: {}", e);
            eprintln!("Error: could not render JSON output");
        }
    }
}

async fn run(cli: Cli, config: Config) -> Result<(), ClientError> {
    let client = || MatchApiClient::from_config(&config);
    let json = cli.json;

    match cli.command {
        Command::Label { score, labels } => {
            let labels = if labels.is_empty() {
                config.labels.clone()
            } else {
                labels
            };
            let label = map_score_to_label(score, labels.as_slice())?;
            emit(json, label, |label| println!("{}", label));
        }
        Command::Health => {
            let client = client()?;
            let health = client.health().await.context("health check")?;
            emit(json, &health, |health| {
                println!("{}: {}", client.base_url(), health.status)
            });
        }
        Command::Predict {
            primary,
            secondary,
            primary_age,
            primary_dob,
            secondary_age,
            secondary_dob,
            labeled,
        } => {
            let primary = subject(primary, primary_age, primary_dob);
            let secondary = subject(secondary, secondary_age, secondary_dob);
            let mut predictor = SinglePairPredictor::from_config(client()?, &config);

            if labeled {
                let labeled = predictor.submit_labeled(&primary, &secondary).await?;
                emit(json, &labeled, |labeled| {
                    print_result(&labeled.result);
                    println!("{}", labeled.label);
                });
            } else {
                let result = predictor.submit(&primary, &secondary).await?;
                emit(json, &result, print_result);
            }
        }
        Command::Rank {
            me,
            age,
            dob,
            concurrent,
            candidates,
        } => {
            let mode = if concurrent {
                RequestMode::Concurrent
            } else {
                config.request_mode
            };
            let mut ranker = MultiCandidateRanker::with_mode(client()?, mode);
            let ranked = ranker
                .submit(&subject(me, age, dob), candidates.as_slice())
                .await?;

            emit(json, &ranked, |ranked| {
                for (position, result) in ranked.iter().enumerate() {
                    let marker = if position == 0 { "★ best match" } else { "" };
                    println!(
                        "{}. {} {}% {}",
                        position + 1,
                        result.secondary_name,
                        result.score,
                        marker
                    );
                }
            });
        }
        Command::History { ranked } => {
            let mut history = PredictionHistory::new(client()?);
            history.load().await?;
            let listed = if ranked {
                history.ranked().into_vec()
            } else {
                history.predictions().to_vec()
            };
            emit(json, listed.as_slice(), |listed| {
                for result in listed {
                    match result.id {
                        Some(id) => print!("[{}] ", id),
                        None => print!("[-] "),
                    }
                    print_result(result);
                }
            });
        }
        Command::DeletePrediction { id } => {
            PredictionHistory::new(client()?)
                .delete(id)
                .await
                .with_context(|| format!("deleting prediction {}", id))?;
            println!("deleted prediction {}", id);
        }
        Command::Notes { command } => {
            let mut notes = NotesCache::new(client()?);
            match command {
                NotesCommand::List => {
                    let loaded = notes.load().await?;
                    emit(json, loaded, |loaded| {
                        for note in loaded {
                            println!("[{}] {}", note.id, note.text);
                        }
                    });
                }
                NotesCommand::Add { text } => {
                    let note = notes.add(&text).await?;
                    emit(json, &note, |note| println!("created note {}", note.id));
                }
                NotesCommand::Delete { id } => {
                    notes
                        .delete(id)
                        .await
                        .with_context(|| format!("deleting note {}", id))?;
                    println!("deleted note {}", id);
                }
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rust_match_predictor=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = Config::from_env()?;
    if let Some(url) = &cli.api_url {
        config.api_base_url = rust_match_predictor::config::validate_base_url(url)?;
    }

    if let Err(e) = run(cli, config).await {
        tracing::debug!("Command failed: {}", e);
        eprintln!("Error: {}", e.user_message());
        std::process::exit(1);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_match_predictor::models::Note;

    #[test]
    fn test_json_flag_is_global() {
        let cli = Cli::try_parse_from(["match", "notes", "list", "--json"]).unwrap();
        assert!(cli.json);

        let cli = Cli::try_parse_from(["match", "health"]).unwrap();
        assert!(!cli.json);
    }

    #[test]
    fn test_render_json_result() {
        let rendered = render_json(&PredictionResult::new("Ana", "Bia", 81)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();

        assert_eq!(value["primary_name"], "Ana");
        assert_eq!(value["secondary_name"], "Bia");
        assert_eq!(value["score"], 81);
        assert!(value.get("id").is_none());
    }

    #[test]
    fn test_render_json_note_list() {
        let notes = vec![Note {
            id: 7,
            text: "milk".to_string(),
            created_at: None,
        }];
        let rendered = render_json(notes.as_slice()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();

        assert_eq!(value[0]["id"], 7);
        assert_eq!(value[0]["text"], "milk");
    }
}
