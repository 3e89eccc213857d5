//! One-shot annotation commands. Results go to stdout as JSON.

use std::path::Path;

use console::style;

use crate::config::Settings;
use crate::conllu;
use crate::labeling::SentenceSelector;
use crate::models::Sentence;
use crate::server::Probabilities;
use crate::services::Services;

async fn read_input(file: &Path) -> anyhow::Result<String> {
    tokio::fs::read_to_string(file)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", file.display(), e))
}

async fn read_first_sentence(file: &Path) -> anyhow::Result<Sentence> {
    let text = read_input(file).await?;
    Ok(conllu::parse_sentence(&text)?)
}

fn print_json<T: serde::Serialize>(probabilities: Vec<T>) -> anyhow::Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(&Probabilities { probabilities })?
    );
    Ok(())
}

/// Predict sentence boundaries for the selected sentence of a document.
pub async fn cmd_split(
    settings: &Settings,
    file: &Path,
    index: Option<usize>,
    sent_id: Option<String>,
) -> anyhow::Result<()> {
    let selector = match (index, sent_id) {
        (Some(i), _) => SentenceSelector::Index(i),
        (None, Some(id)) => SentenceSelector::Id(id),
        (None, None) => anyhow::bail!("Either --index or --sent-id is required"),
    };

    let services = Services::from_settings(settings)?;
    let Some(splitter) = services.splitter else {
        anyhow::bail!("Sentence backend is disabled in the configuration");
    };

    let doc = conllu::parse(&read_input(file).await?)?;
    eprintln!(
        "{} Splitting {} ({}, {} sentences, model: {})",
        style("→").cyan(),
        file.display(),
        selector,
        doc.sentences.len(),
        splitter.labeler_name()
    );

    let probabilities = splitter.split(&doc, &selector).await?;
    print_json(probabilities)
}

/// Score XPOS tags for the first sentence of a file.
pub async fn cmd_tag(settings: &Settings, file: &Path) -> anyhow::Result<()> {
    let services = Services::from_settings(settings)?;
    let Some(tagger) = services.xpos else {
        anyhow::bail!("XPOS backend is disabled in the configuration");
    };

    let sentence = read_first_sentence(file).await?;
    eprintln!(
        "{} Tagging {} tokens with {}",
        style("→").cyan(),
        sentence.tokens.len(),
        tagger.backend_name()
    );
    print_json(tagger.tag(&sentence).await?)
}

/// Dependency-parse the first sentence of a file.
pub async fn cmd_parse(settings: &Settings, file: &Path) -> anyhow::Result<()> {
    let services = Services::from_settings(settings)?;
    let Some(parser) = services.dep else {
        anyhow::bail!("Dependency backend is disabled in the configuration");
    };

    let sentence = read_first_sentence(file).await?;
    eprintln!(
        "{} Parsing {} tokens with {}",
        style("→").cyan(),
        sentence.tokens.len(),
        parser.backend_name()
    );
    print_json(parser.parse(&sentence).await?)
}
