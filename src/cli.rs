//! Minimal CLI: decode submissions | list field paths
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use rayon::prelude::*;
use serde::Serialize;

use formtree::path_de::from_str_with_path;
use formtree::{
    ArrayStrategy, Decoder, DecoderConfig, FieldPaths, FormValue, IndexNotation, Outcome, SchemaNode,
    Submission,
};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// decode flat form submissions against a schema into structured values or field errors
#[derive(Parser, Debug)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// decode submissions and print one outcome per file
    Decode(DecodeOut),
    /// list the dotted field paths a schema accepts
    Fields(FieldsOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// how submission files are read; `auto` treats *.json as JSON and
    /// everything else as an urlencoded body
    #[arg(long, value_enum, default_value_t = SubmissionFormat::Auto)]
    format: SubmissionFormat,

    /// One or more inputs. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum SubmissionFormat {
    Auto,
    Json,
    Urlencoded,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum StrategyArg {
    KeyThenIndex,
    IndexOnly,
    KeyOnly,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum NotationArg {
    Dotted,
    Bracketed,
}

#[derive(clap::Parser, Debug)]
struct DecodeOut {
    /// schema .json file
    #[arg(long, short)]
    schema: PathBuf,

    #[command(flatten)]
    input_settings: InputSettings,

    /// decoder config .json file; the flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// how elements of object arrays are located
    #[arg(long, value_enum)]
    array_strategy: Option<StrategyArg>,

    /// spelling of positional element paths
    #[arg(long, value_enum)]
    index_notation: Option<NotationArg>,

    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// debugging
    #[arg(long)]
    no_op: bool,
}

#[derive(clap::Parser, Debug)]
struct FieldsOut {
    /// schema .json file
    #[arg(long, short)]
    schema: PathBuf,

    /// check a single dotted path instead of listing every leaf
    #[arg(long)]
    resolve: Option<String>,
}

#[derive(Serialize, Debug)]
struct Report {
    file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    outcome: Option<Outcome<FormValue>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl From<StrategyArg> for ArrayStrategy {
    fn from(value: StrategyArg) -> Self {
        match value {
            StrategyArg::KeyThenIndex => ArrayStrategy::KeyThenIndex,
            StrategyArg::IndexOnly => ArrayStrategy::IndexOnly,
            StrategyArg::KeyOnly => ArrayStrategy::KeyOnly,
        }
    }
}

impl From<NotationArg> for IndexNotation {
    fn from(value: NotationArg) -> Self {
        match value {
            NotationArg::Dotted => IndexNotation::Dotted,
            NotationArg::Bracketed => IndexNotation::Bracketed,
        }
    }
}

impl InputSettings {
    fn load(&self) -> Result<Vec<(PathBuf, Submission)>> {
        let source_paths = resolve_file_path_patterns(&self.input)
            .context("failed to resolve input file paths")?;
        let mut out = Vec::with_capacity(source_paths.len());
        for source_path in source_paths {
            let source = std::fs::read_to_string(&source_path)
                .with_context(|| format!("Failed to read source file {}", source_path.display()))?;
            let submission = self
                .parse(&source_path, &source)
                .with_context(|| format!("Failed to parse submission file {}", source_path.display()))?;
            out.push((source_path, submission));
        }
        Ok(out)
    }

    fn parse(&self, path: &Path, source: &str) -> Result<Submission> {
        let json = match self.format {
            SubmissionFormat::Json => true,
            SubmissionFormat::Urlencoded => false,
            SubmissionFormat::Auto => path.extension().is_some_and(|ext| ext == "json"),
        };
        if json {
            Ok(Submission::from_json_str(source)?)
        } else {
            Ok(Submission::from_urlencoded(source))
        }
    }
}

impl DecodeOut {
    fn decoder_config(&self) -> Result<DecoderConfig> {
        let mut config = match self.config.as_ref() {
            Some(path) => DecoderConfig::from_path(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => DecoderConfig::default(),
        };
        if let Some(strategy) = self.array_strategy {
            config.array_strategy = strategy.into();
        }
        if let Some(notation) = self.index_notation {
            config.index_notation = notation.into();
        }
        Ok(config)
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }
    pub fn run(&self) -> Result<()> {
        match &self.cmd {
            Command::Decode(target) => {
                // debug path
                if target.no_op {
                    eprintln!("{self:#?}");
                    return Ok(());
                }

                // 1) schema + policy
                let schema = load_schema(&target.schema)?;
                let config = target.decoder_config()?;
                tracing::debug!(?config, "decoder config");

                // 2) submissions
                let submissions = target.input_settings.load()?;
                tracing::info!(files = submissions.len(), "decoding submissions");

                // 3) decode independently, keep input order
                let decoder = Decoder::new(&schema).with_config(config);
                let reports: Vec<Report> = submissions
                    .par_iter()
                    .map(|(path, submission)| {
                        let file = path.to_string_lossy().to_string();
                        match decoder.decode_value(submission) {
                            Ok(outcome) => Report { file, outcome: Some(outcome), error: None },
                            Err(error) => Report { file, outcome: None, error: Some(error.to_string()) },
                        }
                    })
                    .collect();

                for report in &reports {
                    let label = match &report.outcome {
                        Some(outcome) if outcome.is_valid() => "valid".green(),
                        Some(_) => "invalid".yellow(),
                        None => "fatal".red(),
                    };
                    eprintln!("{label} {}", report.file);
                }

                let src = serde_json::to_string_pretty(&reports)?;
                write_output(target.out.as_deref(), &src)
            }
            Command::Fields(target) => {
                let schema = load_schema(&target.schema)?;
                let fields = FieldPaths::new(&schema);
                match target.resolve.as_deref() {
                    Some(dotted) => println!("{}", fields.name(dotted)?),
                    None => {
                        for leaf in fields.leaves() {
                            println!("{leaf}");
                        }
                    }
                }
                Ok(())
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn load_schema(path: &Path) -> Result<SchemaNode> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read schema file {}", path.display()))?;
    from_str_with_path::<SchemaNode>(&source)
        .map_err(|error| anyhow!("Failed to parse schema file ({}): {error}", path.display()))
}

fn write_output(out: Option<&Path>, src: &str) -> Result<()> {
    match out {
        Some(out) => {
            if let Some(parent) = out.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(out, src)
                .with_context(|| format!("Failed to write output file {}", out.display()))
        }
        None => {
            println!("{src}");
            Ok(())
        }
    }
}

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let mut matched_any = false;
            for entry in glob::glob(pattern)? {
                out.push(entry?);
                matched_any = true;
            }
            if !matched_any {
                bail!("glob pattern matched no files: {pattern}");
            }
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}
