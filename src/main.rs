use std::sync::Arc;

use anyhow::{bail, Result};
use clap::{Arg, ArgAction, Command};
use tracing::info;
use tracing_subscriber::EnvFilter;

use incant::api::{ApiClient, CommandService};
use incant::auth;
use incant::config::Config;
use incant::examples;
use incant::http_client::{HttpClient, ReqwestHttpClient};
use incant::oneshot;
use incant::output::copy_to_clipboard;
use incant::session::SessionContext;
use incant::tui;

fn cli() -> Command {
    Command::new("incant")
        .about("Turn natural-language prompts into shell commands")
        .arg(
            Arg::new("prompt")
                .help("What the command should do, in plain words")
                .num_args(0..),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Verbose log output")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("confirm")
                .short('p')
                .long("prompt")
                .help("Ask before executing the generated command")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("run")
                .short('r')
                .long("run")
                .help("Execute the generated command without asking")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("interactive")
                .short('t')
                .long("tui")
                .help("Open the interactive session")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("explain")
                .short('e')
                .long("explain")
                .help("Explain each generated command")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("outfile")
                .short('o')
                .long("outfile")
                .help("Write the generated command to an executable file")
                .value_name("FILE")
                .num_args(1),
        )
        .arg(
            Arg::new("language")
                .short('l')
                .long("language")
                .help("Target language or environment for generation")
                .value_name("LANG")
                .num_args(1),
        )
        .subcommand(
            Command::new("login")
                .about("Authenticate against the generation service")
                .arg(
                    Arg::new("guest")
                        .long("guest")
                        .help("Register a guest session instead of logging in")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("config")
                .about("Inspect or change persistent settings")
                .subcommand(Command::new("get").about("Show the current configuration"))
                .subcommand(
                    Command::new("set")
                        .about("Change a configuration value")
                        .arg(Arg::new("key").required(true))
                        .arg(Arg::new("value").required(true)),
                ),
        )
        .subcommand(Command::new("examples").about("Show example prompts and the commands they produce"))
        .subcommand(
            Command::new("subscription")
                .about("Manage the generation subscription")
                .subcommand(Command::new("status").about("Show subscription state"))
                .subcommand(Command::new("start").about("Start a subscription"))
                .subcommand(Command::new("cancel").about("Cancel the subscription")),
        )
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli().get_matches();
    let interactive = matches.get_flag("interactive");

    // The interactive session owns the terminal, so log output would tear
    // the frame apart. Route it to the void there; everywhere else honour
    // RUST_LOG, with -v forcing info level.
    if interactive {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_writer(std::io::sink)
            .init();
    } else {
        let filter = if matches.get_flag("verbose") {
            EnvFilter::new("info")
        } else {
            EnvFilter::from_default_env()
        };
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    let mut config = Config::load()?;
    let http: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::new());

    match matches.subcommand() {
        Some(("login", sub)) => return run_login(http, &mut config, sub.get_flag("guest")).await,
        Some(("config", sub)) => return run_config(&mut config, sub),
        Some(("subscription", sub)) => return run_subscription(http, &config, sub).await,
        Some(("examples", _)) => {
            return examples::show(&mut std::io::stdin().lock(), &mut std::io::stdout())
        }
        _ => {}
    }

    let mut ctx = SessionContext::from_config(&config);
    if matches.get_flag("run") {
        ctx.auto_execute = true;
    }
    if matches.get_flag("confirm") {
        ctx.confirm_exec = true;
    }
    if matches.get_flag("explain") {
        ctx.explain = true;
    }
    if let Some(outfile) = matches.get_one::<String>("outfile") {
        ctx.outfile = outfile.clone();
        ctx.save_output = true;
    }
    if let Some(language) = matches.get_one::<String>("language") {
        ctx.language = language.clone();
    }

    let prompt_words: Vec<String> = matches
        .get_many::<String>("prompt")
        .unwrap_or_default()
        .cloned()
        .collect();
    let prompt = if prompt_words.is_empty() {
        None
    } else {
        Some(prompt_words.join(" "))
    };

    let service: Arc<dyn CommandService> = Arc::new(ApiClient::new(http, config.flid.clone()));

    if interactive || prompt.is_none() {
        tui::run(service, ctx, prompt).await
    } else {
        oneshot::run(service, &ctx, prompt.as_deref().unwrap_or_default()).await
    }
}

async fn run_login(http: Arc<dyn HttpClient>, config: &mut Config, guest: bool) -> Result<()> {
    let client = ApiClient::new(Arc::clone(&http), config.flid.clone());
    let flid = if guest {
        info!("registering guest session");
        client.register_guest().await?
    } else {
        let token = auth::login(http).await?;
        client.login(&token).await?
    };
    config.set_flid(flid)?;
    println!("Login successful.");
    Ok(())
}

fn run_config(config: &mut Config, matches: &clap::ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("get", _)) | None => {
            config.show();
            Ok(())
        }
        Some(("set", sub)) => {
            let key = sub.get_one::<String>("key").map(String::as_str);
            let value = sub.get_one::<String>("value").map(String::as_str);
            match (key, value) {
                (Some("autoexec"), Some(value)) => {
                    config.auto_execute = matches!(value, "true" | "yes" | "on");
                }
                (Some("language"), Some(value)) => {
                    config.language = value.to_string();
                }
                (Some(other), _) => bail!("unknown configuration key: {}", other),
                (None, _) => bail!("missing configuration key"),
            }
            config.save()?;
            println!("Configuration updated.");
            Ok(())
        }
        Some((other, _)) => bail!("unknown config subcommand: {}", other),
    }
}

async fn run_subscription(
    http: Arc<dyn HttpClient>,
    config: &Config,
    matches: &clap::ArgMatches,
) -> Result<()> {
    let client = ApiClient::new(http, config.flid.clone());
    let status = match matches.subcommand() {
        Some(("start", _)) => client.subscription_start().await?,
        Some(("cancel", _)) => client.subscription_cancel().await?,
        _ => client.subscription_status().await?,
    };

    if status.subscription {
        println!("Subscription active.");
    } else {
        println!("No active subscription.");
    }
    if !status.subscription_url.is_empty() {
        println!("Manage it at: {}", status.subscription_url);
        if copy_to_clipboard(&status.subscription_url).is_ok() {
            println!("(copied to clipboard)");
        }
    }
    Ok(())
}
