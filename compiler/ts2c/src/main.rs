//! ts2c command line.

use std::path::PathBuf;

use ts2c::diagnostic::emitter::{ColorMode, DiagnosticEmitter, TerminalEmitter};
use ts2c::diagnostic::error_count;
use ts2c::{compile, init_tracing, CompileOptions};

const USAGE: &str = "Usage: ts2c <input.ts> [-o <output.c>] [--color=auto|always|never] [--check]";

/// Parsed command line.
#[derive(Debug, Default)]
struct Args {
    input: Option<String>,
    output: Option<PathBuf>,
    color: ColorMode,
    check: bool,
}

fn parse_args(args: &[String]) -> Result<Args, String> {
    let mut parsed = Args::default();
    let mut i = 0;
    while i < args.len() {
        let arg = &args[i];
        if arg == "-o" {
            let Some(path) = args.get(i + 1) else {
                return Err("`-o` needs a path".to_string());
            };
            parsed.output = Some(PathBuf::from(path));
            i += 2;
            continue;
        }
        if let Some(mode) = arg.strip_prefix("--color=") {
            parsed.color =
                ColorMode::parse(mode).ok_or_else(|| format!("unknown color mode `{mode}`"))?;
        } else if arg == "--check" {
            parsed.check = true;
        } else if arg.starts_with('-') {
            return Err(format!("unknown option `{arg}`"));
        } else if parsed.input.is_none() {
            parsed.input = Some(arg.clone());
        } else {
            return Err(format!("unexpected argument `{arg}`"));
        }
        i += 1;
    }
    Ok(parsed)
}

fn main() {
    init_tracing();
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() || args.iter().any(|arg| arg == "-h" || arg == "--help") {
        println!("{USAGE}");
        return;
    }
    let args = match parse_args(&args) {
        Ok(args) => args,
        Err(message) => {
            eprintln!("error: {message}");
            eprintln!("{USAGE}");
            std::process::exit(1);
        }
    };
    let Some(input) = args.input else {
        eprintln!("error: missing input file");
        eprintln!("{USAGE}");
        std::process::exit(1);
    };
    let source = match std::fs::read_to_string(&input) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("error: could not read `{input}`: {err}");
            std::process::exit(1);
        }
    };

    let is_tty = std::io::IsTerminal::is_terminal(&std::io::stderr());
    let mut emitter = TerminalEmitter::with_color_mode(std::io::stderr(), args.color, is_tty)
        .with_source(source.as_str())
        .with_file_path(input.as_str());

    let options = CompileOptions {
        file_path: Some(input.clone()),
        ..CompileOptions::default()
    };
    let output = match compile(&source, &options) {
        Ok(output) => output,
        Err(err) => {
            emitter.emit(&err.to_diagnostic());
            emitter.flush();
            std::process::exit(1);
        }
    };

    emitter.emit_all(&output.diagnostics);
    let errors = error_count(&output.diagnostics);
    let warnings = output
        .diagnostics
        .iter()
        .filter(|diagnostic| diagnostic.is_warning())
        .count();
    if errors > 0 || warnings > 0 {
        emitter.emit_summary(errors, warnings);
    }
    emitter.flush();
    if !output.success {
        std::process::exit(1);
    }
    if args.check {
        return;
    }

    let output_path = args
        .output
        .unwrap_or_else(|| PathBuf::from(&input).with_extension("c"));
    if let Err(err) = std::fs::write(&output_path, output.code) {
        eprintln!("error: could not write `{}`: {err}", output_path.display());
        std::process::exit(1);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn strings(args: &[&str]) -> Vec<String> {
        args.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_parse_all_options() {
        let args =
            parse_args(&strings(&["main.ts", "-o", "out.c", "--color=never", "--check"])).unwrap();
        assert_eq!(args.input.as_deref(), Some("main.ts"));
        assert_eq!(args.output, Some(PathBuf::from("out.c")));
        assert_eq!(args.color, ColorMode::Never);
        assert!(args.check);
    }

    #[test]
    fn test_rejects_bad_options() {
        assert!(parse_args(&strings(&["a.ts", "-o"])).is_err());
        assert!(parse_args(&strings(&["a.ts", "--color=purple"])).is_err());
        assert!(parse_args(&strings(&["a.ts", "b.ts"])).is_err());
        assert!(parse_args(&strings(&["--fast"])).is_err());
    }
}
