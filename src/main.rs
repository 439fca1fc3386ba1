use std::fs;
use std::io::{self, Read};

use anyhow::{Context, Result, bail};
use clap::Parser;

use retrace::{Lexer, Pattern, compile};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Pattern to search for
    pattern: String,

    /// File to search (stdin when omitted)
    #[arg(value_name = "FILE")]
    file: Option<String>,

    /// Print only the matched spans, one per line
    #[arg(short = 'o', long, conflicts_with_all = ["count", "lex"])]
    only_matching: bool,

    /// With -o, print this capture group instead of the whole match
    #[arg(short = 'g', long, value_name = "N", requires = "only_matching")]
    group: Option<usize>,

    /// Print the total number of matches instead of the matching lines
    #[arg(short = 'c', long)]
    count: bool,

    /// Tokenize each line instead of searching: the pattern classifies
    /// tokens and SEP must match the text between them
    #[arg(long, value_name = "SEP")]
    lex: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let input = read_input(args.file.as_deref())?;

    if let Some(sep) = args.lex.as_deref() {
        return lex_lines(&args.pattern, sep, &input);
    }

    let pattern = compile(&args.pattern)?;
    if args.count {
        let total: usize = input
            .lines()
            .map(|line| count_matches(&pattern, line))
            .sum();
        println!("{total}");
    } else if args.only_matching {
        for line in input.lines() {
            print_matches(&pattern, line, args.group);
        }
    } else {
        for line in input.lines() {
            if pattern.matches(line).accepted() {
                println!("{line}");
            }
        }
    }
    Ok(())
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => fs::read_to_string(path).with_context(|| format!("failed to read {path}")),
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            Ok(buf)
        }
    }
}

fn count_matches(pattern: &Pattern, line: &str) -> usize {
    let mut m = pattern.matches(line);
    let mut n = 0;
    while m.accepted() {
        n += 1;
        m.next();
    }
    n
}

fn print_matches(pattern: &Pattern, line: &str, group: Option<usize>) {
    let mut m = pattern.matches(line);
    while m.accepted() {
        let text = match group {
            Some(index) => m.group_str(index),
            None => m.matched(),
        };
        if let Some(text) = text {
            println!("{text}");
        }
        m.next();
    }
}

fn lex_lines(content: &str, separator: &str, input: &str) -> Result<()> {
    let lexer = Lexer::new(content, separator)?;
    for (number, line) in input.lines().enumerate() {
        let mut tokens = lexer.tokens(line);
        for token in tokens.by_ref() {
            match token.class {
                Some(class) => println!("{class}:{}", token.text),
                None => println!("-:{}", token.text),
            }
        }
        if tokens.failed() {
            bail!(
                "line {}: text between tokens does not match the separator",
                number + 1
            );
        }
    }
    Ok(())
}
