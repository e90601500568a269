use std::io::{self, Read};
use std::time::Duration;

use anyhow::Context;
use serde::Serialize;
use structopt::StructOpt;

use pravka::edit::TextEdit;
use pravka::engine::{CorrectOptions, Correction, CorrectionEngine, EngineConfig, Mode};
use pravka::provider::languagetool::{LanguageToolConfig, LanguageToolProvider};
use pravka::provider::{CorrectionProvider, FixedProvider};

#[derive(Debug, StructOpt)]
#[structopt(
    name = "pravka",
    about = "Corrects Russian text: grammar, quotes, dashes and typography."
)]
struct Opts {
    /// Correction mode: base, legal or strict
    #[structopt(short, long, default_value = "legal")]
    mode: Mode,

    /// Print the result as JSON with the edit list
    #[structopt(long)]
    json: bool,

    /// Print an HTML diff of the changes instead of the plain result
    #[structopt(long)]
    diff: bool,

    /// Skip the typography pass
    #[structopt(long)]
    no_typography: bool,

    /// Skip the remote grammar checker and run the rule pipeline only
    #[structopt(long)]
    no_check: bool,

    /// LanguageTool server URL
    #[structopt(long, default_value = "https://api.languagetool.org")]
    endpoint: String,

    /// Language tag sent to the grammar checker
    #[structopt(long, default_value = "ru-RU")]
    language: String,

    /// Timeout for grammar checker calls, in seconds
    #[structopt(long, default_value = "10")]
    timeout: u64,

    /// Maximum accepted text length, in characters
    #[structopt(long, default_value = "15000")]
    max_len: usize,

    /// Text to correct; read from stdin when omitted
    text: Option<String>,
}

trait OutputWriter {
    fn write_correction(&mut self, correction: &Correction);
    fn finish(&mut self);
}

struct StdoutWriter {
    diff: bool,
}

impl OutputWriter for StdoutWriter {
    fn write_correction(&mut self, correction: &Correction) {
        match (&correction.diff, self.diff) {
            (Some(diff), true) => println!("{}", diff),
            _ => println!("{}", correction.text),
        }
    }

    fn finish(&mut self) {}
}

#[derive(Serialize)]
struct Stats {
    chars_count: usize,
    edits_count: usize,
}

#[derive(Serialize)]
struct JsonOutput {
    result: String,
    edits: Vec<TextEdit>,
    stats: Stats,
    #[serde(skip_serializing_if = "Option::is_none")]
    diff: Option<String>,
}

#[derive(Default)]
struct JsonWriter {
    output: Option<JsonOutput>,
}

impl OutputWriter for JsonWriter {
    fn write_correction(&mut self, correction: &Correction) {
        self.output = Some(JsonOutput {
            result: correction.text.clone(),
            edits: correction.edits.clone(),
            stats: Stats {
                chars_count: correction.text.chars().count(),
                edits_count: correction.edits.len(),
            },
            diff: correction.diff.clone(),
        });
    }

    fn finish(&mut self) {
        if let Some(output) = &self.output {
            println!("{}", serde_json::to_string_pretty(output).unwrap());
        }
    }
}

fn correct<P: CorrectionProvider>(
    provider: P,
    config: EngineConfig,
    text: &str,
    mode: Mode,
    options: &CorrectOptions,
) -> anyhow::Result<Correction> {
    let engine = CorrectionEngine::with_config(provider, config);
    Ok(engine.correct_with_options(text, mode, options)?)
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();
    let opts = Opts::from_args();

    let text = match &opts.text {
        Some(text) => text.clone(),
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read text from stdin")?;
            buffer
        }
    };

    let config = EngineConfig {
        max_text_len: opts.max_len,
        default_mode: opts.mode,
        typography: !opts.no_typography,
    };
    let options = CorrectOptions {
        typography: !opts.no_typography,
        diff: opts.diff,
    };

    let correction = if opts.no_check {
        correct(FixedProvider::empty(), config, &text, opts.mode, &options)?
    } else {
        let provider = LanguageToolProvider::new(LanguageToolConfig {
            endpoint: opts.endpoint.clone(),
            language: opts.language.clone(),
            timeout: Duration::from_secs(opts.timeout),
        });
        correct(provider, config, &text, opts.mode, &options)?
    };

    let mut writer: Box<dyn OutputWriter> = if opts.json {
        Box::new(JsonWriter::default())
    } else {
        Box::new(StdoutWriter { diff: opts.diff })
    };
    writer.write_correction(&correction);
    writer.finish();

    Ok(())
}
