//! Terminal client for the coderunner backend.
//!
//! Examples:
//!   coderunner-cli run hello.py
//!   coderunner-cli --url http://127.0.0.1:5000 run main.cpp
//!   coderunner-cli optimize slow.py --write
//!   coderunner-cli generate --lang cpp binary search over a sorted vector
//!   coderunner-cli config
//!
//! The backend URL comes from `--url`, then `CODERUNNER_URL`, then the config
//! file, then http://127.0.0.1:5000.

use std::path::PathBuf;
use std::process;

use coderunner::editor::{BufferEditor, EditorWidget};
use coderunner::language::language_for_path;
use coderunner::protocol::REQUEST_HEADERS;
use coderunner::view::{MetricSlot, NoticeLevel};
use coderunner::{
    Action, ClientConfig, Command, EditorHandle, HttpReply, OutgoingRequest, TransportError,
    Workbench,
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

const DEFAULT_CLI_URL: &str = "http://127.0.0.1:5000";

#[derive(Debug, Clone, PartialEq, Eq)]
enum CliCommand {
    Run {
        file: PathBuf,
        lang: Option<String>,
    },
    Optimize {
        file: PathBuf,
        lang: Option<String>,
        write: bool,
    },
    Generate {
        prompt: String,
        lang: Option<String>,
    },
    Config,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliArgs {
    url: Option<String>,
    config: Option<PathBuf>,
    command: CliCommand,
}

fn usage() -> ! {
    eprintln!("coderunner-cli (talks to the runner backend @ {DEFAULT_CLI_URL} by default)");
    eprintln!("Usage: coderunner-cli [--url URL] [--config PATH] <command> [args]\n");
    eprintln!("Commands:");
    eprintln!("  run <file> [--lang L]                 Execute a source file");
    eprintln!("  optimize <file> [--lang L] [--write]  Ask the AI for a faster version");
    eprintln!("  generate [--lang L] <prompt...>       Generate code from a prompt");
    eprintln!("  config                                Print the effective configuration");
    process::exit(2);
}

fn parse_args(mut args: Vec<String>) -> Result<CliArgs, String> {
    let mut url = None;
    let mut config = None;
    loop {
        match args.first().map(String::as_str) {
            Some("--url") if args.len() >= 2 => {
                url = Some(args[1].clone());
                args.drain(0..2);
            }
            Some("--config") if args.len() >= 2 => {
                config = Some(PathBuf::from(&args[1]));
                args.drain(0..2);
            }
            Some("--url") | Some("--config") => return Err(format!("{} needs a value", args[0])),
            _ => break,
        }
    }

    if args.is_empty() {
        return Err("missing command".to_string());
    }
    let cmd = args.remove(0);

    let mut lang = None;
    let mut write = false;
    let mut rest = Vec::new();
    let mut it = args.into_iter();
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--lang" => lang = Some(it.next().ok_or("--lang needs a value")?),
            "--write" => write = true,
            _ => rest.push(arg),
        }
    }

    let command = match cmd.as_str() {
        "run" | "optimize" => {
            let [file] = <[String; 1]>::try_from(rest)
                .map_err(|_| format!("{cmd} takes exactly one file"))?;
            let file = PathBuf::from(file);
            if cmd == "run" {
                if write {
                    return Err("--write only applies to optimize".to_string());
                }
                CliCommand::Run { file, lang }
            } else {
                CliCommand::Optimize { file, lang, write }
            }
        }
        "generate" => {
            if write {
                return Err("--write only applies to optimize".to_string());
            }
            CliCommand::Generate {
                prompt: rest.join(" "),
                lang,
            }
        }
        "config" => {
            if write || lang.is_some() || !rest.is_empty() {
                return Err("config takes no arguments".to_string());
            }
            CliCommand::Config
        }
        other => return Err(format!("unknown command: {other}")),
    };

    Ok(CliArgs {
        url,
        config,
        command,
    })
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("coderunner").join("config.json"))
}

fn load_config(args: &CliArgs) -> Result<ClientConfig, coderunner::ConfigError> {
    let mut config = match (&args.config, default_config_path()) {
        (Some(path), _) => ClientConfig::load(path)?,
        (None, Some(path)) => ClientConfig::load_or_default(&path)?,
        (None, None) => ClientConfig::default(),
    };
    config.apply_env();
    config.apply_url_override(args.url.clone());
    if config.base_url.is_empty() {
        config.base_url = DEFAULT_CLI_URL.to_string();
    }
    Ok(config)
}

async fn send(
    client: &reqwest::Client,
    url: &str,
    req: &OutgoingRequest,
) -> Result<HttpReply, TransportError> {
    let mut builder = client.post(url);
    for (name, value) in REQUEST_HEADERS {
        builder = builder.header(name, value);
    }
    let response = builder
        .json(&req.body)
        .send()
        .await
        .map_err(|e| TransportError::Network(e.to_string()))?;

    let status = response.status();
    let status_text = status.canonical_reason().unwrap_or_default().to_string();
    let body = response
        .text()
        .await
        .map_err(|e| TransportError::Network(e.to_string()))?;
    Ok(HttpReply::new(status.as_u16(), status_text, body))
}

/// Print what the page would show for `action`; returns whether it succeeded.
fn render(wb: &mut Workbench, action: Action) -> bool {
    let notices = wb.view_mut().take_notices();
    let mut ok = true;
    for notice in &notices {
        eprintln!("{notice}");
        if notice.level == NoticeLevel::Error || notice.level == NoticeLevel::Warning {
            ok = false;
        }
    }

    let view = wb.view();
    match action {
        Action::Run => {
            println!("{}", view.output.text);
            println!();
            for slot in MetricSlot::all() {
                println!("{:<17} {}", format!("{}:", slot.label()), view.metrics.get(*slot));
            }
            ok && !view.output.errored
        }
        Action::Optimize => {
            ok && notices.iter().any(|n| n.level == NoticeLevel::Success)
        }
        Action::Generate => {
            println!("{}", view.generated.text);
            ok && !view.generated.errored
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = match parse_args(std::env::args().skip(1).collect()) {
        Ok(args) => args,
        Err(msg) => {
            eprintln!("{msg}");
            usage();
        }
    };
    let config = load_config(&args)?;
    debug!("using backend {}", config.base_url);

    let mut wb = Workbench::new(&config);
    let (action, source) = match &args.command {
        CliCommand::Config => {
            println!("{}", config.to_json_pretty()?);
            return Ok(());
        }
        CliCommand::Run { file, lang } | CliCommand::Optimize { file, lang, .. } => {
            let code = std::fs::read_to_string(file)?;
            let mut widget = BufferEditor::with_text(code);
            widget.configure(&config.editor)?;
            let language = lang
                .clone()
                .or_else(|| language_for_path(&file.to_string_lossy()).map(str::to_string))
                .unwrap_or_else(|| config.default_language.clone());
            wb.attach_editor(EditorHandle::new(Box::new(widget)));
            wb.dispatch(Command::SelectLanguage(language));
            let action = match args.command {
                CliCommand::Run { .. } => Action::Run,
                _ => Action::Optimize,
            };
            (action, Some(file.clone()))
        }
        CliCommand::Generate { prompt, lang } => {
            if let Some(lang) = lang {
                wb.dispatch(Command::SelectLanguage(lang.clone()));
            }
            wb.dispatch(Command::SetPrompt(prompt.clone()));
            (Action::Generate, None)
        }
    };

    let command = match action {
        Action::Run => Command::Run,
        Action::Optimize => Command::Optimize,
        Action::Generate => Command::Generate,
    };
    if let Some(req) = wb.dispatch(command) {
        let url = wb.url_for(&req);
        info!("POST {}", url);
        let client = reqwest::Client::new();
        let reply = send(&client, &url, &req).await;
        wb.complete(req.action, reply);
    }

    let succeeded = render(&mut wb, action);

    if let (CliCommand::Optimize { write, .. }, Some(file)) = (&args.command, source) {
        if let Some(editor) = wb.editor() {
            if succeeded && *write {
                std::fs::write(&file, editor.value())?;
                eprintln!("wrote {}", file.display());
            } else if succeeded {
                println!("{}", editor.value());
            }
        }
    }

    if !succeeded {
        process::exit(1);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_run_with_global_flags() {
        let parsed = parse_args(args(&[
            "--url",
            "http://runner:5000",
            "run",
            "main.cpp",
            "--lang",
            "cpp",
        ]))
        .unwrap();
        assert_eq!(parsed.url.as_deref(), Some("http://runner:5000"));
        assert_eq!(
            parsed.command,
            CliCommand::Run {
                file: PathBuf::from("main.cpp"),
                lang: Some("cpp".into())
            }
        );
    }

    #[test]
    fn parses_optimize_write() {
        let parsed = parse_args(args(&["optimize", "--write", "slow.py"])).unwrap();
        assert_eq!(
            parsed.command,
            CliCommand::Optimize {
                file: PathBuf::from("slow.py"),
                lang: None,
                write: true
            }
        );
    }

    #[test]
    fn generate_joins_prompt_words() {
        let parsed = parse_args(args(&["generate", "--lang", "cpp", "reverse", "a", "list"]))
            .unwrap();
        assert_eq!(
            parsed.command,
            CliCommand::Generate {
                prompt: "reverse a list".into(),
                lang: Some("cpp".into())
            }
        );
    }

    #[test]
    fn rejects_bad_invocations() {
        assert!(parse_args(args(&[])).is_err());
        assert!(parse_args(args(&["--url"])).is_err());
        assert!(parse_args(args(&["run"])).is_err());
        assert!(parse_args(args(&["run", "a.py", "b.py"])).is_err());
        assert!(parse_args(args(&["run", "a.py", "--write"])).is_err());
        assert!(parse_args(args(&["optimize", "a.py", "--lang"])).is_err());
        assert!(parse_args(args(&["dance"])).is_err());
    }

    #[test]
    fn config_command_takes_no_file() {
        let parsed = parse_args(args(&["--config", "/tmp/c.json", "config"])).unwrap();
        assert_eq!(parsed.config, Some(PathBuf::from("/tmp/c.json")));
        assert_eq!(parsed.command, CliCommand::Config);
    }

    #[test]
    fn config_rejects_stray_arguments() {
        assert!(parse_args(args(&["config", "extra.json"])).is_err());
        assert!(parse_args(args(&["config", "--lang", "cpp"])).is_err());
        assert!(parse_args(args(&["config", "--write"])).is_err());
    }
}
