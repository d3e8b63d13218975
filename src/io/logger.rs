use crate::dto::LexError;
use tracing_subscriber::EnvFilter;

/// Sends diagnostics to stderr, stdout is reserved for the rendered HTML.
///
/// Verbosity comes from `RUST_LOG` and defaults to warnings only.
pub fn init() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[inline]
pub fn red(string: String) -> String {
    format!("{}{}{}", "\u{001b}[31m\u{001b}[1m", string, "\u{001b}[0m")
}

/// Formats a fatal error report, with the line and column when the error has one.
pub fn error_info(file_name: &str, error: &anyhow::Error) -> String {
    let position = error
        .downcast_ref::<LexError>()
        .and_then(LexError::position);
    match position {
        Some((line, column)) =>
            format!("{}: {}:{}:{}\n{}", red(String::from("error")), file_name, line, column, error),
        None => format!("{}: {}\n{}", red(String::from("error")), file_name, error),
    }
}

pub fn print_error_info(file_name: &str, error: &anyhow::Error) {
    eprintln!("\n{}\n", error_info(file_name, error))
}

pub fn print_usage(program: &str) {
    eprintln!("{}: missing input file\nusage: {} <file.json>", red(String::from("error")), program)
}

/// Testing that lexer errors are reported with their position.
#[test]
fn test_error_info_with_position() {
    let error = anyhow::Error::new(LexError::UnexpectedLiteral {
        keyword: "null",
        found: 'x',
        line: 3,
        column: 7,
    });
    let expected = format!(
        "{}: data.json:3:7\ninvalid literal, expected `null` but found 'x'",
        red(String::from("error")),
    );
    assert_eq!(expected, error_info("data.json", &error))
}

/// Testing errors that have no position.
#[test]
fn test_error_info_without_position() {
    let error = anyhow::Error::new(LexError::Read(std::io::Error::new(
        std::io::ErrorKind::Other,
        "disk on fire",
    )));
    let expected = format!(
        "{}: data.json\ncan't read input: disk on fire",
        red(String::from("error")),
    );
    assert_eq!(expected, error_info("data.json", &error))
}
