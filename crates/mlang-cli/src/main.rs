use anyhow::{Context, Result, bail};
use mlang_config::Config;
use mlang_engine::{
    Document, EditingHost, EditorSession, Marker, clean, is_decorated, scan_markers,
};
use std::{
    env,
    io::{self, Read, Write},
    path::PathBuf,
    process::ExitCode,
};

const USAGE: &str = "\
Usage: mlang [--config PATH] <command> [args]

Commands:
  decorate [FILE]       Wrap every {mlang} marker in its editing span
  clean [FILE]          Strip editing spans back to raw markers
  wrap <CODE> [TEXT]    Print TEXT wrapped in a marker pair for CODE
  markers [FILE]        List every marker with its byte range
  menu                  List configured languages in menu order
  check [FILE]          Fail if any decorated marker remains

FILE defaults to standard input; '-' also reads standard input.";

#[derive(Debug, PartialEq)]
enum Command {
    Decorate(Option<PathBuf>),
    Clean(Option<PathBuf>),
    Wrap { code: String, text: String },
    Markers(Option<PathBuf>),
    Menu,
    Check(Option<PathBuf>),
    Help,
}

#[derive(Debug, PartialEq)]
struct Invocation {
    config_path: Option<PathBuf>,
    command: Command,
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<Invocation> {
    let mut config_path = None;
    let mut positional = Vec::new();

    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" | "-c" => {
                let path = args.next().context("--config needs a path")?;
                config_path = Some(PathBuf::from(path));
            }
            "--help" | "-h" => positional.insert(0, "help".to_string()),
            _ => positional.push(arg),
        }
    }

    let mut positional = positional.into_iter();
    let Some(name) = positional.next() else {
        return Ok(Invocation {
            config_path,
            command: Command::Help,
        });
    };

    let input = |arg: Option<String>| arg.filter(|a| a != "-").map(PathBuf::from);
    let command = match name.as_str() {
        "decorate" => Command::Decorate(input(positional.next())),
        "clean" => Command::Clean(input(positional.next())),
        "markers" => Command::Markers(input(positional.next())),
        "check" => Command::Check(input(positional.next())),
        "menu" => Command::Menu,
        "help" => Command::Help,
        "wrap" => {
            let code = positional.next().context("wrap needs a language code")?;
            let text = positional.collect::<Vec<_>>().join(" ");
            Command::Wrap { code, text }
        }
        other => bail!("Unknown command '{other}'\n\n{USAGE}"),
    };

    Ok(Invocation {
        config_path,
        command,
    })
}

fn read_input(path: Option<&PathBuf>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read standard input")?;
            Ok(buffer)
        }
    }
}

fn describe(marker: &Marker) -> String {
    match marker {
        Marker::Open { code } => format!("open\t{code}"),
        Marker::Close => "close".to_string(),
    }
}

/// Run `command` against already-read input, returning the text to print and
/// whether the run succeeded.
fn execute(command: &Command, config: &Config, input: &str) -> Result<(String, bool)> {
    let output = match command {
        Command::Decorate(_) => {
            let session = EditorSession::open(
                Document::new(input),
                config.capability,
                &config.languages,
            );
            session.host().text()
        }
        Command::Clean(_) => clean(input).into_owned(),
        Command::Wrap { code, text } => {
            let mut session =
                EditorSession::open(Document::new(text), config.capability, &config.languages);
            let len = session.host().len();
            session.host_mut().set_selection(0..len);
            session.choose_language(code)?;
            session.host().text()
        }
        Command::Markers(_) => scan_markers(input)
            .iter()
            .map(|found| {
                format!(
                    "{}..{}\t{}\n",
                    found.range.start,
                    found.range.end,
                    describe(&found.marker)
                )
            })
            .collect(),
        Command::Menu => config
            .languages
            .iter()
            .map(|lang| format!("{}\t{}\n", lang.code, lang.label))
            .collect(),
        Command::Check(_) => {
            if is_decorated(input) {
                return Ok(("decorated markers remain\n".to_string(), false));
            }
            String::new()
        }
        Command::Help => format!("{USAGE}\n"),
    };

    Ok((output, true))
}

fn run() -> Result<ExitCode> {
    let invocation = parse_args(env::args().skip(1))?;
    let config = Config::load_or_default(invocation.config_path.as_deref())?;
    log::debug!(
        "capability: {}, {} language(s)",
        config.capability,
        config.languages.len()
    );

    let input = match &invocation.command {
        Command::Decorate(path)
        | Command::Clean(path)
        | Command::Markers(path)
        | Command::Check(path) => read_input(path.as_ref())?,
        Command::Wrap { .. } | Command::Menu | Command::Help => String::new(),
    };

    let (output, ok) = execute(&invocation.command, &config, &input)?;
    if ok {
        io::stdout().write_all(output.as_bytes())?;
        Ok(ExitCode::SUCCESS)
    } else {
        io::stderr().write_all(output.as_bytes())?;
        Ok(ExitCode::FAILURE)
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Warn)
        .parse_default_env()
        .init();

    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn output(command: Command, config: &Config, input: &str) -> String {
        let (text, ok) = execute(&command, config, input).unwrap();
        assert!(ok);
        text
    }

    #[test]
    fn no_arguments_shows_help() {
        let invocation = parse_args(args(&[])).unwrap();
        assert_eq!(invocation.command, Command::Help);
        assert_eq!(invocation.config_path, None);
    }

    #[test]
    fn parses_config_flag_anywhere() {
        let invocation = parse_args(args(&["clean", "--config", "/tmp/c.toml", "in.html"])).unwrap();

        assert_eq!(invocation.config_path, Some(PathBuf::from("/tmp/c.toml")));
        assert_eq!(
            invocation.command,
            Command::Clean(Some(PathBuf::from("in.html")))
        );
    }

    #[test]
    fn dash_means_stdin() {
        let invocation = parse_args(args(&["decorate", "-"])).unwrap();
        assert_eq!(invocation.command, Command::Decorate(None));
    }

    #[test]
    fn wrap_joins_remaining_words() {
        let invocation = parse_args(args(&["wrap", "es", "Hola", "mundo"])).unwrap();
        assert_eq!(
            invocation.command,
            Command::Wrap {
                code: "es".into(),
                text: "Hola mundo".into()
            }
        );
    }

    #[test]
    fn wrap_without_code_is_an_error() {
        assert!(parse_args(args(&["wrap"])).is_err());
    }

    #[test]
    fn unknown_command_is_an_error() {
        assert!(parse_args(args(&["translate"])).is_err());
    }

    #[test]
    fn config_flag_without_path_is_an_error() {
        assert!(parse_args(args(&["menu", "--config"])).is_err());
    }

    #[test]
    fn decorate_and_clean_round_trip() {
        let config = Config::default();
        let raw = "Hello {mlang en}World{mlang}\n";

        let decorated = output(Command::Decorate(None), &config, raw);
        assert!(decorated.contains(r#"<span class="filter-multilang-tag">{mlang}</span>"#));

        assert_eq!(output(Command::Clean(None), &config, &decorated), raw);
    }

    #[test]
    fn decorate_passes_through_without_capability() {
        let config = Config {
            capability: false,
            ..Config::default()
        };
        let raw = "{mlang en}x{mlang}";
        assert_eq!(output(Command::Decorate(None), &config, raw), raw);
    }

    #[test]
    fn wrap_prints_fragment() {
        let command = Command::Wrap {
            code: "es".into(),
            text: "Hola".into(),
        };
        assert_eq!(
            output(command, &Config::default(), ""),
            r#"&nbsp;<span class="filter-multilang-tag">{mlang es}</span>Hola<span class="filter-multilang-tag">{mlang}</span>&nbsp;"#
        );
    }

    #[test]
    fn wrap_empty_text_uses_placeholder() {
        let command = Command::Wrap {
            code: "en".into(),
            text: String::new(),
        };
        let fragment = output(command, &Config::default(), "");
        assert!(fragment.contains("{mlang en}</span>&nbsp;<span"));
    }

    #[test]
    fn markers_lists_ranges() {
        let listing = output(Command::Markers(None), &Config::default(), "a{mlang en}b{mlang}");
        assert_eq!(listing, "1..11\topen\ten\n12..19\tclose\n");
    }

    #[test]
    fn menu_lists_languages_in_order() {
        let config = Config {
            languages: [("es", "Español"), ("en", "English")].into_iter().collect(),
            ..Config::default()
        };
        assert_eq!(
            output(Command::Menu, &config, ""),
            "es\tEspañol\nen\tEnglish\n"
        );
    }

    #[test]
    fn check_fails_on_decorated_input() {
        let config = Config::default();
        let (_, ok) = execute(
            &Command::Check(None),
            &config,
            r#"<span class="filter-multilang-tag">{mlang}</span>"#,
        )
        .unwrap();
        assert!(!ok);

        let (_, ok) = execute(&Command::Check(None), &config, "{mlang}").unwrap();
        assert!(ok);
    }
}
