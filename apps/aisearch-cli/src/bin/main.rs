use std::env;
use std::time::Duration;

use anyhow::{bail, Context};
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use aisearch_core::config::expand_path;
use aisearch_core::Settings;
use aisearch_index::index_ctrl;
use aisearch_search::{AiSearchOperator, SearchMode, DEFAULT_TOP_K};

const DEFAULT_INPUT: &str = "text_sample.json";
const DEFAULT_OUTPUT: &str = "docVectors.json";

fn usage(prog: &str) -> String {
    format!(
        "Usage:\n  {prog} index [input] [output]\n  {prog} search <{}> \"<query>\" [--top N] [--weight W] [--filter F]",
        SearchMode::NAMES.join("|")
    )
}

struct SearchArgs {
    mode: String,
    query: String,
    top_k: usize,
    weight: Option<f64>,
    filter: Option<String>,
}

fn parse_search_args(args: &[String]) -> anyhow::Result<SearchArgs> {
    let mut positional = Vec::new();
    let mut top_k = DEFAULT_TOP_K;
    let mut weight = None;
    let mut filter = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            flag @ ("--top" | "--weight" | "--filter") => {
                let value = args.get(i + 1).with_context(|| format!("{flag} requires a value"))?;
                match flag {
                    "--top" => top_k = value.parse().with_context(|| format!("--top expects a number, got {value}"))?,
                    "--weight" => weight = Some(value.parse().with_context(|| format!("--weight expects a number, got {value}"))?),
                    _ => filter = Some(value.clone()),
                }
                i += 1;
            }
            other if other.starts_with("--") => bail!("unknown flag {other}"),
            other => positional.push(other.to_string()),
        }
        i += 1;
    }
    let mut positional = positional.into_iter();
    match (positional.next(), positional.next()) {
        (Some(mode), Some(query)) => Ok(SearchArgs { mode, query, top_k, weight, filter }),
        _ => bail!("search needs a mode and a query"),
    }
}

fn run_index(settings: &Settings, args: &[String]) -> anyhow::Result<()> {
    let input = expand_path(args.first().map(String::as_str).unwrap_or(DEFAULT_INPUT));
    let output = expand_path(args.get(1).map(String::as_str).unwrap_or(DEFAULT_OUTPUT));

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?);
    pb.set_message(format!("indexing {} into {}", input.display(), settings.search_index));
    pb.enable_steady_tick(Duration::from_millis(120));
    let outcome = index_ctrl(settings, &input, &output);
    pb.finish_and_clear();

    let summary = outcome.with_context(|| format!("indexing {} failed", input.display()))?;
    println!("✅ Uploaded {} documents to {}", summary.uploaded, settings.search_index);
    println!("📄 Embedded documents written to {}", output.display());
    Ok(())
}

fn run_search(settings: &Settings, args: &[String]) -> anyhow::Result<()> {
    let parsed = parse_search_args(args)?;
    let Some(mode) = SearchMode::from_name(&parsed.mode, parsed.top_k, parsed.weight, parsed.filter) else {
        bail!("unknown search mode {}; expected one of {}", parsed.mode, SearchMode::NAMES.join(", "));
    };
    let operator = AiSearchOperator::new(settings)?;
    let mut results = operator.search(&mode, &parsed.query)?;

    if matches!(mode, SearchMode::SemanticHybrid { .. }) {
        for answer in results.answers()? {
            println!("💡 Answer: {}", answer.display_text());
            if let Some(score) = answer.score {
                println!("   Score: {score:.4}");
            }
        }
    }

    let mut shown = 0;
    for hit in results {
        let hit = hit?;
        shown += 1;
        println!("\n{shown}. {}", hit.title.as_deref().unwrap_or("<untitled>"));
        println!("   Score: {:.4}", hit.score);
        if let Some(reranker) = hit.reranker_score {
            println!("   Reranker score: {reranker:.4}");
        }
        if let Some(category) = &hit.category {
            println!("   Category: {category}");
        }
        if let Some(content) = &hit.content {
            println!("   Content: {content}");
        }
        for caption in hit.captions() {
            println!("   Caption: {}", caption.display_text());
        }
    }
    if shown == 0 {
        println!("No results for \"{}\"", parsed.query);
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let mut args: Vec<String> = env::args().collect();
    let prog = if args.is_empty() { "aisearch".to_string() } else { args.remove(0) };
    if args.is_empty() {
        eprintln!("{}", usage(&prog));
        std::process::exit(1);
    }
    let cmd = args.remove(0);

    let settings = Settings::load().map_err(|e| {
        eprintln!("Error loading config: {e}");
        e
    })?;
    tracing::debug!(index = %settings.search_index, endpoint = %settings.search_service_endpoint, "settings loaded");

    match cmd.as_str() {
        "index" => run_index(&settings, &args),
        "search" => run_search(&settings, &args),
        _ => {
            eprintln!("Unknown command: {cmd}\n{}", usage(&prog));
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(v: &[&str]) -> Vec<String> { v.iter().map(|s| s.to_string()).collect() }

    #[test]
    fn search_args_defaults() {
        let a = parse_search_args(&strings(&["hybrid", "cats"])).unwrap();
        assert_eq!((a.mode.as_str(), a.query.as_str(), a.top_k), ("hybrid", "cats", DEFAULT_TOP_K));
        assert_eq!(a.weight, None);
        assert_eq!(a.filter, None);
    }

    #[test]
    fn search_args_flags_anywhere() {
        let a = parse_search_args(&strings(&["--top", "5", "vector", "--filter", "category eq 'pets'", "cats", "--weight", "0.5"])).unwrap();
        assert_eq!(a.top_k, 5);
        assert_eq!(a.weight, Some(0.5));
        assert_eq!(a.filter.as_deref(), Some("category eq 'pets'"));
        assert_eq!(a.query, "cats");
    }

    #[test]
    fn search_args_rejects_bad_input() {
        assert!(parse_search_args(&strings(&["hybrid"])).is_err());
        assert!(parse_search_args(&strings(&["hybrid", "cats", "--top"])).is_err());
        assert!(parse_search_args(&strings(&["hybrid", "cats", "--top", "many"])).is_err());
        assert!(parse_search_args(&strings(&["hybrid", "cats", "--verbose"])).is_err());
    }
}
