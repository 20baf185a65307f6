//!
//! storefront-admin binary
//! -----------------------
//! Command-line dashboard for the storefront API. Runs one command, or an
//! interactive interpreter with `--repl`. The saved session persists between
//! invocations.

use std::env;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use storefront_admin::cli::{execute, parse_command, run_repl, usage};
use storefront_admin::config::AdminConfig;
use storefront_admin::identity::FileSessionStore;
use storefront_admin::pages::App;
use storefront_admin::api::ApiClient;

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .context("Failed to build log filter")?;
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let mut args: Vec<String> = env::args().collect();
    let program = if args.is_empty() { "storefront-admin".to_string() } else { args.remove(0) };

    let mut api_url: Option<String> = None;
    let mut session_dir: Option<String> = None;
    let mut repl = false;
    let mut rest: Vec<String> = Vec::new();

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--api-url" => {
                if i + 1 >= args.len() { eprintln!("--api-url requires a value"); eprintln!("{}", usage(&program)); std::process::exit(2); }
                api_url = Some(args[i + 1].clone());
                i += 2;
            }
            "--session-dir" => {
                if i + 1 >= args.len() { eprintln!("--session-dir requires a value"); eprintln!("{}", usage(&program)); std::process::exit(2); }
                session_dir = Some(args[i + 1].clone());
                i += 2;
            }
            "--repl" => { repl = true; i += 1; }
            "-h" | "--help" => {
                println!("{}", usage(&program));
                return Ok(());
            }
            _ => {
                rest.extend(args[i..].iter().cloned());
                break;
            }
        }
    }

    let mut config = AdminConfig::from_env().context("Invalid environment configuration")?;
    if let Some(url) = api_url {
        config = config.with_api_url(url).context("Invalid --api-url")?;
    }
    if let Some(dir) = session_dir {
        config = config.with_session_dir(dir);
    }

    let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "<unset>".to_string());
    info!(
        target: "storefront_admin",
        "storefront-admin starting: RUST_LOG='{}', api_url={}, session_dir='{}'",
        rust_log, config.api_url, config.session_dir.display()
    );

    let store = FileSessionStore::shared(&config.session_dir);
    let client = ApiClient::new(&config, store).context("Failed to build API client")?;
    let mut app = App::new(client);

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build Tokio runtime")?;

    if repl || rest.is_empty() {
        if !repl {
            eprintln!("{}", usage(&program));
            std::process::exit(2);
        }
        return run_repl(&rt, &mut app);
    }

    let cmd = match parse_command(&rest) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {}", e.notice_text());
            eprintln!("{}", usage(&program));
            std::process::exit(2);
        }
    };
    match rt.block_on(execute(&mut app, cmd)) {
        Ok(Some(text)) => {
            println!("{}", text);
            Ok(())
        }
        Ok(None) => Ok(()),
        Err(e) => {
            eprintln!("error: {}", e.notice_text());
            std::process::exit(1);
        }
    }
}
