use std::error::Error;
use std::ffi::OsString;

use protoscan::batch::parse_batch;
use protoscan::policies::{CapturedField, FeeExtractor, FieldCollector, PathSelector};
use protoscan::protobuf::{DecodePolicy, ParseOptions, parse_field_path};

mod input;
mod output;

use input::{InputMessage, parse_messages, read_input};
use output::{FieldOutput, MessageOutput, format_text};

/// What to extract from each message.
enum Mode {
    /// Extract the Cosmos SDK transaction fee.
    Fee,

    /// Capture the fields at the given paths.
    Capture(Vec<Vec<u64>>),

    /// Capture every field of the root message.
    Dump,
}

struct Args {
    /// Input file, or `None` for stdin.
    input: Option<String>,

    mode: Mode,

    /// Print one JSON object per message instead of text.
    json: bool,

    /// Enable verbose logging for decoding.
    verbose: bool,
}

/// Parse a `--capture` path. The root path is rejected since it can never
/// match a field.
fn parse_capture_path(path: &str) -> Result<Vec<u64>, lexopt::Error> {
    let numbers = parse_field_path(path)
        .map_err(|err| format!("invalid capture path \"{}\": {}", path, err))?;
    if numbers.is_empty() {
        return Err("capture path must not be empty".into());
    }
    Ok(numbers)
}

fn parse_args() -> Result<Args, lexopt::Error> {
    parse_args_from(std::env::args_os())
}

/// Parse command line arguments. The first item is the binary name.
fn parse_args_from<I>(args: I) -> Result<Args, lexopt::Error>
where
    I: IntoIterator,
    I::Item: Into<OsString>,
{
    use lexopt::prelude::*;

    let mut input = None;
    let mut fee = false;
    let mut captures = Vec::new();
    let mut json = false;
    let mut verbose = false;

    let mut parser = lexopt::Parser::from_iter(args);
    while let Some(arg) = parser.next()? {
        match arg {
            Value(val) if input.is_none() => input = Some(val.string()?),
            Short('f') | Long("fee") => fee = true,
            Short('c') | Long("capture") => {
                let path = parser.value()?.string()?;
                captures.push(parse_capture_path(&path)?);
            }
            Short('j') | Long("json") => json = true,
            Short('v') | Long("verbose") => verbose = true,
            Short('h') | Long("help") => {
                println!(
                    "Extract fields from hex-encoded Protocol Buffers messages.

Reads one message per line from <input>, or stdin if <input> is \"-\" or
omitted. By default every field of the root message is printed.

Usage: {bin_name} [OPTIONS] [<input>]

  -f, --fee             Extract the fee from Cosmos SDK transactions
  -c, --capture <PATH>  Capture fields at PATH, eg. \"2:2:1\". Repeatable.
  -j, --json            Print one JSON object per message
  -v, --verbose         Enable verbose logging
  -h, --help            Print help

The number of decoding threads can be set with PROTOSCAN_NUM_THREADS.
",
                    bin_name = parser.bin_name().unwrap_or("protoscan")
                );
                std::process::exit(0);
            }
            _ => return Err(arg.unexpected()),
        }
    }

    let mode = match (fee, captures.is_empty()) {
        (true, false) => return Err("`--fee` and `--capture` cannot be combined".into()),
        (true, true) => Mode::Fee,
        (false, false) => Mode::Capture(captures),
        (false, true) => Mode::Dump,
    };

    Ok(Args {
        input,
        mode,
        json,
        verbose,
    })
}

/// Decode all messages in a batch.
///
/// Lines which are not valid hex are reported as errors without being
/// decoded. The policy is returned for each message which decoded
/// successfully.
fn decode_messages<P, F>(
    messages: &[InputMessage],
    make_policy: F,
) -> Vec<(MessageOutput, Option<P>)>
where
    P: DecodePolicy + Send,
    F: Fn() -> P + Sync,
{
    let buffers: Vec<&[u8]> = messages
        .iter()
        .filter_map(|msg| msg.bytes.as_deref().ok())
        .collect();

    // Results are in the same order as the valid messages.
    let mut results = parse_batch(&buffers, ParseOptions::default(), make_policy).into_iter();

    messages
        .iter()
        .map(|msg| {
            let mut output = MessageOutput::new(msg.line);
            let policy = match &msg.bytes {
                Err(err) => {
                    output.error = Some(format!("invalid hex: {}", err));
                    None
                }
                Ok(_) => match results.next() {
                    Some(Ok(policy)) => Some(policy),
                    Some(Err(err)) => {
                        output.error = Some(err.to_string());
                        None
                    }
                    None => {
                        output.error = Some("message was not decoded".to_string());
                        None
                    }
                },
            };
            (output, policy)
        })
        .collect()
}

fn extract_fees(messages: &[InputMessage]) -> Vec<(MessageOutput, Vec<CapturedField>)> {
    decode_messages(messages, FeeExtractor::new)
        .into_iter()
        .map(|(mut output, extractor)| {
            output.fee = extractor.and_then(|extractor| extractor.fee());
            (output, Vec::new())
        })
        .collect()
}

/// Decode messages using a [`FieldCollector`] and keep the captured fields.
fn collect_fields<F>(
    messages: &[InputMessage],
    make_collector: F,
) -> Vec<(MessageOutput, Vec<CapturedField>)>
where
    F: Fn() -> FieldCollector + Sync,
{
    decode_messages(messages, make_collector)
        .into_iter()
        .map(|(mut output, collector)| {
            let Some(collector) = collector else {
                return (output, Vec::new());
            };
            let fields = collector.into_fields();
            output.fields = Some(fields.iter().map(FieldOutput::from).collect());
            (output, fields)
        })
        .collect()
}

/// Tool for extracting values from Protocol Buffers messages without a
/// schema.
///
/// ```text
/// echo 0a05757374656d | protoscan
/// protoscan --fee transactions.txt
/// protoscan --json -c 2:2:1:1 -c 2:2:1:2 transactions.txt
/// ```
fn main() -> Result<(), Box<dyn Error>> {
    let args = parse_args()?;

    if args.verbose {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_writer(std::io::stderr)
            .init();
    }

    let text = read_input(args.input.as_deref())?;
    let messages = parse_messages(&text);
    tracing::debug!(messages = messages.len(), "read input");

    let results: Vec<(MessageOutput, Vec<CapturedField>)> = match args.mode {
        Mode::Fee => extract_fees(&messages),
        Mode::Capture(paths) => {
            let selector = paths
                .iter()
                .fold(PathSelector::new(), |selector, path| selector.with_target(path));
            collect_fields(&messages, || FieldCollector::new(selector.clone()))
        }
        Mode::Dump => collect_fields(&messages, FieldCollector::root_fields),
    };

    for (output, fields) in &results {
        if args.json {
            println!("{}", serde_json::to_string(output)?);
        } else {
            print!("{}", format_text(output, fields));
        }
    }

    Ok(())
}
