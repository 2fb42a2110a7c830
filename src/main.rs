/*!
Encode a text file and persist the resulting fields
*/
use anyhow::format_err;
use clap::{App, Arg};
use corpus_encoder::{CorpusEncoder, EncoderConfig, Field, Source};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn, Level};

const DEFAULT_FRACTION: &str = "1";

fn log_level(verbosity: usize) -> Level {
    match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

pub fn main() -> anyhow::Result<()> {
    let matches = App::new("Corpus Encoder")
        .version("1.0")
        .about("Tokenizes a text corpus, builds a vocabulary and one-hot encodes the corpus against it")
        .arg(
            Arg::with_name("INPUT")
                .help("The text file to encode")
                .index(1),
        )
        .arg(
            Arg::with_name("fraction")
                .short("f")
                .long("fraction")
                .help("Proportion of distinct tokens, ranked by frequency, to keep in the vocabulary. Defaults to 1")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("segmented")
                .short("s")
                .long("segmented")
                .help("The input already holds one sentence per line"),
        )
        .arg(
            Arg::with_name("data-root")
                .short("o")
                .long("data-root")
                .help("Directory under which encoded fields are saved. Defaults to the current directory")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("no-save")
                .long("no-save")
                .help("Do not save any encoded fields"),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .long("verbose")
                .help("Sets the level of verbosity")
                .takes_value(true),
        )
        .get_matches();

    let verbosity = matches
        .value_of("verbose")
        .map(|v| usize::from_str_radix(v, 10))
        .unwrap_or(Ok(0))?;
    tracing_subscriber::fmt()
        .with_max_level(log_level(verbosity))
        .with_writer(std::io::stderr)
        .init();

    let fraction: f64 = matches
        .value_of("fraction")
        .unwrap_or(DEFAULT_FRACTION)
        .parse()
        .map_err(|err| format_err!("Invalid value for fraction: {}", err))?;
    let mut config = EncoderConfig::default()
        .with_fraction(fraction)
        .with_sentence_segmented(matches.is_present("segmented"));
    if let Some(root) = matches.value_of("data-root") {
        config = config.with_data_root(root);
    }
    config.validate()?;

    let mut encoder = CorpusEncoder::new(config);
    let source = matches.value_of("INPUT").map(Source::path);
    let name = match encoder.run(source)? {
        Some(name) => name,
        None => {
            warn!("No input file given, nothing to encode");
            return Ok(());
        }
    };
    let stats = encoder.stats();
    info!(
        source = %name,
        data_size = stats.data_size,
        vocab_size = stats.vocab_size,
        max_sentence_length = stats.max_sentence_length,
        "encoded corpus"
    );

    if matches.is_present("no-save") {
        return Ok(());
    }
    let fields = &Field::DEFAULT_SAVED;
    let progress = ProgressBar::new(fields.len() as u64);
    progress.set_style(ProgressStyle::default_bar().template("Saving fields: {wide_bar} {pos}/{len}: {msg:20}"));
    for field in fields.iter() {
        progress.set_message(field.name());
        let path = encoder.persist(*field)?;
        progress.println(format!("{} -> {}", field, path.display()));
        progress.inc(1);
    }
    progress.finish_and_clear();
    Ok(())
}
