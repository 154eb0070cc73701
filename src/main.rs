use inplace_input::{logging, read_integer, read_line, Result};
use log::LevelFilter;
use std::path::PathBuf;

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let options = parse_args(&args);

    match &options.log_file {
        Some(path) => logging::init(path, LevelFilter::Debug)?,
        None => {
            logging::init_from_env(LevelFilter::Debug)?;
        }
    }

    match read_line("name: ", Some(options.limit), true)? {
        Some(name) => println!("name = {}", name),
        None => {
            println!();
            println!("cancelled");
            return Ok(());
        }
    }

    match read_integer("age: ", true)? {
        Some(age) => println!("age = {}", age),
        None => {
            println!();
            println!("cancelled");
        }
    }

    Ok(())
}

struct DemoOptions {
    log_file: Option<PathBuf>,
    limit: usize,
}

fn parse_args(args: &[String]) -> DemoOptions {
    let mut options = DemoOptions {
        log_file: None,
        limit: 20,
    };

    let mut iter = args.iter().peekable();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--log" => {
                if let Some(next) = iter.peek() {
                    if !next.starts_with('-') {
                        options.log_file = Some(PathBuf::from((*next).clone()));
                        iter.next();
                    }
                }
            }
            "--limit" => {
                if let Some(limit) = iter.peek().and_then(|next| next.parse().ok()) {
                    options.limit = limit;
                    iter.next();
                }
            }
            _ => {}
        }
    }

    options
}
