use std::env;
use std::io;
use std::io::Write;
use std::process;

use tracing_subscriber::EnvFilter;

use pcfg_cky::format::{check_probs_format, check_table_format};
use pcfg_cky::{extract_tree, Err, Grammar};

fn usage(prog_name: &str) -> String {
  format!(
    r"Usage: {} FILE [options]

Reads sentences from stdin, one per line, and prints their most likely parse.

Options:
  -h, --help        Print this message
  -c, --chart       Print the backpointer chart (defaults to not printing)
  -p, --probs       Print the log probability table (defaults to not printing)
  -n, --no-verify   Don't reject grammars that fail validation

Set RUST_LOG=debug to see what the parser is doing.",
    prog_name
  )
}

fn parse(g: &Grammar, sentence: &str, opts: &Args) -> Result<(), Err> {
  let sentence = sentence.split_whitespace().collect::<Vec<_>>();
  if sentence.is_empty() {
    return Ok(());
  }

  let (chart, probs) = g.parse_chart(&sentence);
  debug_assert!(check_table_format(&chart) && check_probs_format(&probs));

  if opts.print_chart {
    println!("chart:\n{}", chart);
  }
  if opts.print_probs {
    println!("log probabilities:\n{}", probs);
  }

  let n = sentence.len();
  match probs.entry(0, n, &g.start) {
    Some(log_prob) => {
      let tree = extract_tree(&chart, 0, n, &g.start)?;
      println!("{}", tree);
      println!("log probability: {}\n", log_prob);
    }
    None => println!("not in the language\n"),
  }

  Ok(())
}

struct Args {
  filename: String,
  print_chart: bool,
  print_probs: bool,
  verify: bool,
}

impl Args {
  fn make_error_message(msg: &str, prog_name: impl AsRef<str>) -> String {
    format!("argument error: {}.\n\n{}", msg, usage(prog_name.as_ref()))
  }

  fn parse(v: Vec<String>) -> Result<Self, String> {
    let mut iter = v.into_iter();
    let prog_name = match iter.next() {
      Some(name) => name,
      None => return Err(Self::make_error_message("bad argument vector", "cli")),
    };

    let mut filename: Option<String> = None;
    let mut print_chart = false;
    let mut print_probs = false;
    let mut verify = true;

    for o in iter {
      if o == "-h" || o == "--help" {
        println!("{}", usage(&prog_name));
        process::exit(0);
      } else if o == "-c" || o == "--chart" {
        print_chart = true;
      } else if o == "-p" || o == "--probs" {
        print_probs = true;
      } else if o == "-n" || o == "--no-verify" {
        verify = false;
      } else if filename.is_none() {
        filename = Some(o);
      } else {
        return Err(Self::make_error_message("invalid arguments", prog_name));
      }
    }

    if let Some(filename) = filename {
      Ok(Self {
        filename,
        print_chart,
        print_probs,
        verify,
      })
    } else {
      Err(Self::make_error_message("missing filename", prog_name))
    }
  }
}

fn main() -> Result<(), Err> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .with_writer(io::stderr)
    .init();

  let opts = match Args::parse(env::args().collect()) {
    Ok(opts) => opts,
    Err(msg) => {
      eprintln!("{}", msg);
      process::exit(255);
    }
  };

  let g = Grammar::read_from_file(&opts.filename)?;
  if opts.verify {
    g.validate()?;
  }
  tracing::info!(
    file = %opts.filename,
    rules = g.rules().len(),
    start = %g.start,
    "grammar ready"
  );

  let mut input = String::new();
  loop {
    print!("> ");
    io::stdout().flush()?;

    match io::stdin().read_line(&mut input) {
      Ok(_) => {
        if input.is_empty() {
          // ctrl+d
          return Ok(());
        }
        input.make_ascii_lowercase();
        parse(&g, input.trim(), &opts)?;
        input.clear();
      }
      Err(error) => return Err(error.into()),
    }
  }
}
