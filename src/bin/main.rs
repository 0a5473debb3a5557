use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use crossterm::cursor::MoveTo;
use crossterm::execute;
use crossterm::style::{style, Color, Stylize};
use crossterm::terminal::{Clear, ClearType};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs;
use std::io::{self, stdin, stdout, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use threshold_core::config::AppConfig;
use threshold_core::core::corpus::{load_allow_list, load_frequencies};
use threshold_core::core::types::{SessionResult, ThresholdModel};
use threshold_core::operator::{Operator, SamplePresentation};
use threshold_core::partition::{anagram_unique, extract_fixed_length};
use threshold_core::persistence::{load_results, save_results, ResultsRecord};
use threshold_core::run::{completed, run_all, LengthOutcome, RunPlan};
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "word_threshold", version, about = "Find the frequency at which words feel too obscure")]
struct Cli {
    /// Config file (TOML). Defaults to $WORD_THRESHOLD_CONFIG or the user config dir.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Interactive sampling session over every configured word length (default).
    Session(SessionArgs),
    /// Filter a word list down to one length, optionally dropping anagrams.
    Partition(PartitionArgs),
    /// Print a previously written results file.
    Show {
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[derive(Args, Default)]
struct SessionArgs {
    #[arg(long)]
    corpus: Option<PathBuf>,
    #[arg(long)]
    allow_list: Option<PathBuf>,
    #[arg(long)]
    output: Option<PathBuf>,
    #[arg(long)]
    seed: Option<u64>,
    /// Comma-separated word lengths, e.g. 4,5,6
    #[arg(long, value_delimiter = ',')]
    lengths: Option<Vec<usize>>,
}

#[derive(Args)]
struct PartitionArgs {
    #[arg(long)]
    input: PathBuf,
    #[arg(long)]
    output: PathBuf,
    #[arg(long)]
    length: usize,
    #[arg(long)]
    unique_anagrams: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    match dispatch(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn dispatch(cli: Cli) -> Result<()> {
    let config = AppConfig::load(cli.config.as_deref())?;
    match cli.command.unwrap_or(Command::Session(SessionArgs::default())) {
        Command::Session(args) => run_session(config, args),
        Command::Partition(args) => run_partition(args),
        Command::Show { output } => show(output.as_deref().unwrap_or(&config.run.output)),
    }
}

fn run_session(mut config: AppConfig, args: SessionArgs) -> Result<()> {
    if let Some(path) = args.corpus {
        config.corpus.path = path;
    }
    if let Some(path) = args.allow_list {
        config.corpus.allow_list = path;
    }
    if let Some(path) = args.output {
        config.run.output = path;
    }
    if let Some(lengths) = args.lengths {
        config.run.word_lengths = lengths;
    }
    let seed = args.seed.or(config.session.seed);

    info!(
        corpus = %config.corpus.path.display(),
        allow_list = %config.corpus.allow_list.display(),
        output = %config.run.output.display(),
        lengths = ?config.run.word_lengths,
        sample_count = config.session.sample_count,
        cluster_size = config.session.cluster_size,
        seed = ?seed,
        "loaded word-threshold config"
    );

    let records = load_frequencies(&config.corpus.path, config.corpus.delimiter_byte())
        .context("could not load the frequency corpus")?;
    let allow = load_allow_list(&config.corpus.allow_list).context("could not load the allow-list")?;

    let plan = RunPlan {
        word_lengths: config.run.word_lengths.clone(),
        min_eligible_words: config.run.min_eligible_words,
        session: config.session_config(),
    };
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut operator = TerminalOperator::new();

    let outcomes = run_all(&records, &allow, &plan, &mut rng, &mut operator)?;
    print_summary(&outcomes);

    let results = completed(&outcomes);
    if results.is_empty() {
        println!("\nNo word length produced a result; nothing saved.");
        return Ok(());
    }

    let record = ResultsRecord::from_results(&results);
    match save_results(&record, &config.run.output) {
        Ok(()) => {
            info!(path = %config.run.output.display(), lengths = results.len(), "results written");
            println!("\nResults saved to '{}'", config.run.output.display());
        }
        // The analysis is already done; a failed write is reported, not fatal.
        Err(e) => error!("could not save results: {e}"),
    }
    Ok(())
}

fn run_partition(args: PartitionArgs) -> Result<()> {
    let raw = fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read word list {}", args.input.display()))?;
    let mut words = extract_fixed_length(raw.lines(), args.length);
    if args.unique_anagrams {
        words = anagram_unique(&words);
    }

    let mut body = words.join("\n");
    body.push('\n');
    fs::write(&args.output, body)
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    info!(length = args.length, words = words.len(), output = %args.output.display(), "wrote partition");
    Ok(())
}

fn show(path: &Path) -> Result<()> {
    let record = load_results(path).with_context(|| format!("failed to read {}", path.display()))?;
    println!("Generated at {}", record.generated_at.to_rfc3339());
    for (length, report) in &record.lengths {
        println!(
            "{}",
            style(format!(
                "{length} letters: breakpoint {} ({}-{}), {} samples",
                report.breakpoint, report.confidence.lower, report.confidence.upper, report.samples
            ))
            .bold()
        );
        for example in &report.examples {
            println!("    {:<12} {:>10}", example.word, example.frequency);
        }
    }
    Ok(())
}

fn print_summary(outcomes: &[LengthOutcome]) {
    println!("\n{}", style("Summary").bold().with(Color::Cyan));
    println!("---------------------------------------------------------------");
    for outcome in outcomes {
        match outcome {
            LengthOutcome::Completed(result) => print_result(result),
            LengthOutcome::Skipped { word_length, eligible } => println!(
                "{word_length} letters: skipped ({eligible} eligible words)"
            ),
        }
    }
}

fn print_result(result: &SessionResult) {
    let model = &result.model;
    let note = if model.all_acceptable { " (no rejections seen)" } else { "" };
    println!(
        "{} letters: breakpoint ~{:.0} [{:.0}, {:.0}] after {} samples{}",
        result.word_length,
        model.threshold,
        model.confidence.lower,
        model.confidence.upper,
        result.samples,
        note
    );
    let examples: Vec<String> = result
        .examples
        .iter()
        .map(|e| format!("{} ({})", e.word, e.frequency))
        .collect();
    println!("    near the breakpoint: {}", examples.join(", "));
}

/// Stdin operator that renders samples to `out` with a little terminal styling.
struct TerminalOperator<W: Write> {
    out: W,
}

impl TerminalOperator<io::Stdout> {
    fn new() -> Self {
        Self { out: stdout() }
    }
}

impl<W: Write> TerminalOperator<W> {
    fn render(&mut self, sample: &SamplePresentation<'_>) -> io::Result<()> {
        // Clear once per length; later samples scroll under the last estimate.
        if sample.sample_number == 1 {
            execute!(self.out, Clear(ClearType::All), MoveTo(0, 0))?;
        } else {
            writeln!(self.out)?;
        }
        writeln!(
            self.out,
            "{}",
            style(format!(
                "{}-letter words: sample {}/{} ({}, around #{})",
                sample.word_length, sample.sample_number, sample.sample_count, sample.strategy, sample.center_index
            ))
            .bold()
            .with(Color::Cyan)
        )?;
        writeln!(self.out, "---------------------------------------------------------------")?;
        for (i, word) in sample.words.iter().enumerate() {
            writeln!(self.out, "  {:>2}. {:<12} {:>10}", i + 1, word.word, word.frequency)?;
        }
        match sample.model {
            Some(model) => write_estimate(&mut self.out, model)?,
            None => writeln!(self.out, "\nNo estimate yet.")?,
        }
        writeln!(self.out)
    }
}

impl<W: Write> Operator for TerminalOperator<W> {
    fn ask(&mut self, prompt: &str) -> io::Result<String> {
        write!(self.out, "{}", style(prompt).bold())?;
        self.out.flush()?;
        let mut line = String::new();
        // EOF reads as an empty, non-affirmative answer.
        stdin().read_line(&mut line)?;
        Ok(line)
    }

    fn present(&mut self, sample: &SamplePresentation<'_>) {
        if let Err(e) = self.render(sample) {
            debug!(error = %e, "could not draw sample");
        }
    }

    fn report_model(&mut self, model: &ThresholdModel) {
        if let Err(e) = write_estimate(&mut self.out, model) {
            debug!(error = %e, "could not draw estimate");
        }
    }
}

fn write_estimate<W: Write>(out: &mut W, model: &ThresholdModel) -> io::Result<()> {
    let line = format!(
        "Current estimate: ~{:.0} (range {:.0}-{:.0}, slope {:.2})",
        model.threshold, model.confidence.lower, model.confidence.upper, model.slope
    );
    if model.all_acceptable {
        writeln!(out, "\n{}", style(format!("{line}; nothing rejected yet")).with(Color::Yellow))
    } else {
        writeln!(out, "\n{}", style(line).with(Color::Green))
    }
}
