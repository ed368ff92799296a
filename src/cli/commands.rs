//! Command implementations for the Spol CLI.

use crate::cli::{ConfigAction, Output};
use crate::config::Settings;
use crate::pipeline::Pipeline;
use crate::transcription::format_timestamp;
use anyhow::Result;

/// Run the init command: write the default configuration if none exists.
pub fn run_init(settings: &Settings) -> Result<()> {
    let config_path = Settings::default_config_path();

    if config_path.exists() {
        Output::info(&format!(
            "Configuration already exists at {}",
            config_path.display()
        ));
    } else {
        settings.save()?;
        Output::success(&format!("Wrote configuration to {}", config_path.display()));
    }

    std::fs::create_dir_all(settings.index_dir())?;
    Output::success(&format!(
        "Index directory ready at {}",
        settings.index_dir().display()
    ));

    if !crate::openai::is_api_key_configured() {
        Output::info("Set OPENAI_API_KEY to enable transcription, embeddings, and answers.");
    }

    Ok(())
}

/// Run the process command.
pub async fn run_process(source: &str, settings: Settings) -> Result<()> {
    let pipeline = Pipeline::new(settings)?;

    let spinner = Output::spinner("Transcribing and indexing...");
    let result = pipeline.process(source).await;
    spinner.finish_and_clear();

    match result {
        Ok(processed) => {
            Output::success(&format!(
                "Processed '{}' into {} segments",
                processed.video_id,
                processed.segments.len()
            ));
            if let Some(last) = processed.segments.last() {
                Output::kv("duration", &format_timestamp(last.end_seconds));
            }
            Output::kv("video_id", &processed.video_id);
            Ok(())
        }
        Err(e) => {
            Output::error(&format!("Processing failed: {}", e));
            Err(e.into())
        }
    }
}

/// Run the ask command.
pub async fn run_ask(
    video_id: &str,
    question: &str,
    top_k: usize,
    rerank_top_k: usize,
    settings: Settings,
) -> Result<()> {
    let pipeline = Pipeline::new(settings)?;

    let spinner = Output::spinner("Searching video...");
    let result = pipeline.answer(video_id, question, top_k, rerank_top_k).await;
    spinner.finish_and_clear();

    match result {
        Ok(answer) => {
            println!("\n{}\n", answer.answer);

            if !answer.evidence.is_empty() {
                Output::header("Evidence");
                for item in &answer.evidence {
                    Output::evidence(
                        &format!(
                            "{} - {}",
                            format_timestamp(item.start_time),
                            format_timestamp(item.end_time)
                        ),
                        item.relevance_score,
                        &item.text,
                    );
                }
            }

            if !answer.citations.is_empty() {
                Output::header("Cited timestamps");
                for citation in &answer.citations {
                    Output::kv(&format_timestamp(*citation), &format!("{:.1}s", citation));
                }
            }

            Ok(())
        }
        Err(e) => {
            Output::error(&format!("{}", e));
            Err(e.into())
        }
    }
}

/// Run the status command.
pub fn run_status(video_id: &str, settings: Settings) -> Result<()> {
    let pipeline = Pipeline::new(settings)?;

    if pipeline.index_exists(video_id) {
        Output::success(&format!("'{}' is indexed and ready for questions.", video_id));
    } else {
        Output::info(&format!(
            "'{}' has not been processed. Run 'spol process <source>' first.",
            video_id
        ));
    }

    Ok(())
}

/// Run the config command.
pub fn run_config(action: &ConfigAction, settings: Settings) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let content = toml::to_string_pretty(&settings)?;
            println!("{}", content);
        }
        ConfigAction::Path => {
            println!("{}", Settings::default_config_path().display());
        }
    }

    Ok(())
}
