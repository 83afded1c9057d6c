//! multi-git: run git operations and shell commands across many repositories

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command as ClapCommand};
use std::future::Future;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use multi_git::commands::checkout::{handle_checkout_command, CheckoutParams};
use multi_git::commands::clone::{handle_clone_command, CloneParams};
use multi_git::commands::exec::{handle_exec_command, ExecParams};
use multi_git::commands::pull::{handle_pull_command, PullParams};
use multi_git::commands::push::{handle_push_command, PushParams};
use multi_git::commands::tag::{handle_tag_command, TagParams};
use multi_git::commands::{CommandContext, OutputFormat};
use multi_git::config::{default_config_path, load_and_validate};
use multi_git::core::CancellationToken;
use multi_git::shell::DEFAULT_SHELL;
use multi_git::utils::set_terminal_title;

const INTERRUPTED_REASON: &str = "interrupted";
/// 128 + SIGINT
const FORCE_EXIT_CODE: i32 = 130;

fn parallel_arg(short: bool) -> Arg {
    let arg = Arg::new("parallel")
        .long("parallel")
        .value_name("N")
        .help("Number of parallel workers (0 = use config value)")
        .value_parser(value_parser!(i64))
        .default_value("0");
    if short {
        arg.short('p')
    } else {
        arg
    }
}

fn flag(id: &'static str, short: Option<char>, help: &'static str) -> Arg {
    let arg = Arg::new(id).long(id).help(help).action(ArgAction::SetTrue);
    match short {
        Some(c) => arg.short(c),
        None => arg,
    }
}

fn bool_option(id: &'static str, default: &'static str, help: &'static str) -> Arg {
    Arg::new(id)
        .long(id)
        .help(help)
        .value_name("BOOL")
        .value_parser(value_parser!(bool))
        .num_args(0..=1)
        .require_equals(true)
        .default_value(default)
        .default_missing_value("true")
}

fn build_cli() -> ClapCommand {
    ClapCommand::new("multi-git")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Run git operations and shell commands across a fleet of repositories")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("PATH")
                .help("Config file (default: ~/.multi-git/config.yaml)")
                .value_parser(value_parser!(PathBuf))
                .global(true),
        )
        .arg(flag("verbose", Some('v'), "Verbose output and debug logging").global(true))
        .arg(
            Arg::new("format")
                .long("format")
                .value_name("FORMAT")
                .help("Report format")
                .value_parser(["text", "json"])
                .default_value("text")
                .global(true),
        )
        .subcommand(
            ClapCommand::new("clone")
                .about("Clone all configured repositories")
                .arg(bool_option(
                    "skip-existing",
                    "true",
                    "Skip repositories that already exist",
                ))
                .arg(
                    Arg::new("depth")
                        .long("depth")
                        .value_name("N")
                        .help("Shallow clone depth (0 = full clone)")
                        .value_parser(value_parser!(u32))
                        .default_value("0"),
                )
                .arg(parallel_arg(true)),
        )
        .subcommand(
            ClapCommand::new("checkout")
                .about("Check out a branch in all repositories")
                .arg(Arg::new("branch").required(true).help("Branch to check out"))
                .arg(flag("create", Some('b'), "Create the branch if it does not exist"))
                .arg(flag("force", Some('f'), "Discard local changes"))
                .arg(flag("fetch", None, "Fetch from the remote before checking out"))
                .arg(parallel_arg(true)),
        )
        .subcommand(
            ClapCommand::new("pull")
                .about("Pull the current branch in all repositories")
                .arg(
                    Arg::new("remote")
                        .short('r')
                        .long("remote")
                        .value_name("REMOTE")
                        .help("Remote to pull from (default: config default_remote)"),
                )
                .arg(flag("force", Some('f'), "Discard local changes before pulling"))
                .arg(parallel_arg(true)),
        )
        .subcommand(
            ClapCommand::new("tag")
                .about("Create, push or delete a tag in all repositories")
                .arg(
                    Arg::new("name")
                        .short('n')
                        .long("name")
                        .value_name("TAG")
                        .required(true)
                        .help("Tag name"),
                )
                .arg(
                    Arg::new("branch")
                        .short('b')
                        .long("branch")
                        .value_name("BRANCH")
                        .help("Branch to create the tag on (required for creation)"),
                )
                .arg(
                    Arg::new("message")
                        .short('m')
                        .long("message")
                        .value_name("MESSAGE")
                        .help("Tag message (creates an annotated tag)"),
                )
                .arg(flag("push", Some('p'), "Push the tag (or its deletion) to the remote"))
                .arg(flag("force", Some('f'), "Overwrite an existing tag"))
                .arg(flag("delete", Some('d'), "Delete the tag instead of creating it"))
                .arg(parallel_arg(false)),
        )
        .subcommand(
            ClapCommand::new("push")
                .about("Force push a branch in all repositories")
                .arg(
                    Arg::new("branch")
                        .short('b')
                        .long("branch")
                        .value_name("LOCAL[:REMOTE]")
                        .required(true)
                        .help("Branch to push, optionally renamed on the remote"),
                )
                .arg(flag("force", Some('f'), "Force push (required)"))
                .arg(
                    Arg::new("remote")
                        .short('r')
                        .long("remote")
                        .value_name("REMOTE")
                        .help("Remote to push to (default: config default_remote)"),
                )
                .arg(flag("dry-run", None, "Validate without pushing"))
                .arg(flag("yes", Some('y'), "Skip the confirmation prompt"))
                .arg(parallel_arg(false)),
        )
        .subcommand(
            ClapCommand::new("exec")
                .about("Execute a shell command in all repositories")
                .arg(Arg::new("command").required(true).help("Command to execute"))
                .arg(flag("fail-fast", None, "Stop dispatching after the first failure"))
                .arg(
                    Arg::new("shell")
                        .short('s')
                        .long("shell")
                        .value_name("SHELL")
                        .default_value(DEFAULT_SHELL)
                        .help("Shell used to run the command"),
                )
                .arg(flag("dry-run", None, "Show what would run without executing"))
                .arg(bool_option("show-output", "true", "Show command output").short('o'))
                .arg(parallel_arg(true)),
        )
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

/// First signal cancels the run; a second one asks for an immediate exit
async fn watch_interrupts<S, F>(mut next_signal: S, cancel: &CancellationToken) -> Option<i32>
where
    S: FnMut() -> F,
    F: Future<Output = io::Result<()>>,
{
    next_signal().await.ok()?;
    eprintln!("\nInterrupted, finishing running operations (press Ctrl-C again to quit)...");
    cancel.cancel_with_reason(INTERRUPTED_REASON);

    next_signal().await.ok()?;
    eprintln!("Interrupted again, exiting");
    Some(FORCE_EXIT_CODE)
}

fn string_arg(matches: &ArgMatches, id: &str) -> Option<String> {
    matches.get_one::<String>(id).cloned()
}

fn parallel(matches: &ArgMatches) -> i64 {
    matches.get_one::<i64>("parallel").copied().unwrap_or(0)
}

fn dispatch(ctx: CommandContext, name: &str, sub: &ArgMatches) -> Result<bool> {
    let ctx = ctx.with_parallelism(parallel(sub));

    match name {
        "clone" => {
            let params = CloneParams {
                skip_existing: sub.get_one::<bool>("skip-existing").copied().unwrap_or(true),
                depth: sub.get_one::<u32>("depth").copied().unwrap_or(0),
            };
            handle_clone_command(&ctx, &params)
        }
        "checkout" => {
            let params = CheckoutParams {
                branch: string_arg(sub, "branch").unwrap_or_default(),
                create: sub.get_flag("create"),
                force: sub.get_flag("force"),
                fetch: sub.get_flag("fetch"),
            };
            handle_checkout_command(&ctx, &params)
        }
        "pull" => {
            let params = PullParams {
                remote: string_arg(sub, "remote"),
                force: sub.get_flag("force"),
            };
            handle_pull_command(&ctx, &params)
        }
        "tag" => {
            let params = TagParams {
                name: string_arg(sub, "name").unwrap_or_default(),
                branch: string_arg(sub, "branch"),
                message: string_arg(sub, "message").filter(|m| !m.is_empty()),
                push: sub.get_flag("push"),
                force: sub.get_flag("force"),
                delete: sub.get_flag("delete"),
            };
            handle_tag_command(&ctx, &params)
        }
        "push" => {
            let spec = string_arg(sub, "branch").unwrap_or_default();
            let params = PushParams {
                remote: string_arg(sub, "remote"),
                force: sub.get_flag("force"),
                dry_run: sub.get_flag("dry-run"),
                yes: sub.get_flag("yes"),
                ..PushParams::from_spec(&spec)
            };
            handle_push_command(&ctx, &params)
        }
        "exec" => {
            let params = ExecParams {
                shell: string_arg(sub, "shell").unwrap_or_else(|| DEFAULT_SHELL.to_string()),
                fail_fast: sub.get_flag("fail-fast"),
                dry_run: sub.get_flag("dry-run"),
                show_output: sub.get_one::<bool>("show-output").copied().unwrap_or(true),
                ..ExecParams::new(string_arg(sub, "command").unwrap_or_default())
            };
            handle_exec_command(&ctx, &params)
        }
        other => anyhow::bail!("unknown command '{other}'"),
    }
}

fn main() -> Result<ExitCode> {
    let matches = build_cli().get_matches();
    let verbose = matches.get_flag("verbose");
    init_logging(verbose);

    let format: OutputFormat = matches
        .get_one::<String>("format")
        .map(String::as_str)
        .unwrap_or("text")
        .parse()?;

    let config_path = matches
        .get_one::<PathBuf>("config")
        .cloned()
        .unwrap_or_else(default_config_path);
    let config = load_and_validate(&config_path)
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    runtime.spawn(async move {
        if let Some(code) = watch_interrupts(tokio::signal::ctrl_c, &interrupt).await {
            std::process::exit(code);
        }
    });

    let Some((name, sub)) = matches.subcommand() else {
        anyhow::bail!("no command given");
    };

    let ctx = CommandContext::new(config, runtime.handle().clone(), cancel)
        .with_format(format)
        .with_verbose(verbose);

    if ctx.is_text() {
        let _ = set_terminal_title(&format!("🚀 multi-git {name}"));
    }
    let outcome = dispatch(ctx, name, sub);
    if format == OutputFormat::Text {
        let _ = set_terminal_title("✅ multi-git");
    }

    let has_failures = outcome?;
    runtime.shutdown_background();

    Ok(if has_failures {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
