mod dto;
mod io;
mod lexer;
mod render;

use crate::io::logger;
use lexer::TokenReader;
use render::HtmlRenderer;
use std::process;
use tracing::debug;

fn main() {
    logger::init();
    let args: Vec<String> = std::env::args().collect();
    let file_name = match args.get(1) {
        Some(val) => val,
        None => {
            logger::print_usage(args.get(0).map(String::as_str).unwrap_or("json-highlighter"));
            process::exit(2)
        }
    };
    if let Err(e) = run(file_name) {
        logger::print_error_info(file_name, &e);
        process::exit(1)
    }
}

/// Scans the whole file first, then renders it to stdout.
fn run(file_name: &str) -> anyhow::Result<()> {
    let tokens = TokenReader::new().scan_file(file_name)?;
    debug!("{} tokens from {}", tokens.len(), file_name);
    let stdout = std::io::stdout();
    HtmlRenderer::new(stdout.lock()).render(&tokens)?;
    Ok(())
}
