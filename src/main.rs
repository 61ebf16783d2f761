//! netdiag - probe a host, summarise the session and diagnose failures

use clap::Parser;
use netprobe_doctor::{
    app::{self, App},
    cli::Cli,
    config::EnvManager,
    error::{ErrorReporter, Result},
};
use std::process;

#[tokio::main]
async fn main() {
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panic: {}", panic_info);
        process::exit(99);
    }));

    // Usage errors share the configuration exit code
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            process::exit(code);
        }
    };
    let reporter = ErrorReporter::new(cli.use_colors(), cli.verbose || cli.debug);

    if let Err(e) = run_application(cli).await {
        reporter.report_error(&e);
        process::exit(e.exit_code());
    }
}

async fn run_application(cli: Cli) -> Result<()> {
    if cli.env_help {
        return app::emit(&app::env_help()?);
    }

    if cli.env_example {
        return app::emit(&EnvManager::create_example_env_content());
    }

    App::from_cli(cli)?.run().await
}
