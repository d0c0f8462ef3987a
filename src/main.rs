use clap::Parser;
use futures::TryStreamExt;
use std::path::PathBuf;
use std::process;
use upsql::api::{QueryExecutor, Requester, TokenFiller, auth};
use upsql::cli::{self, Cli, Command};
use upsql::error::UpsqlError;
use upsql::masking::format_secret;
use upsql::verbose::{self, Timer};
use upsql::{config, format, output};

#[tokio::main]
async fn main() {
    // Load .env file (optional, ignore if missing)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Execute(ref args) => {
            execute(args, cli.verbose, cli.show_secrets, cli.config.as_ref()).await
        }
        Command::Authenticate(ref args) => {
            authenticate(args, cli.verbose, cli.show_secrets, cli.config.as_ref()).await
        }
    };

    if let Err(err) = result {
        output::print_error(&err);
        process::exit(1);
    }
}

async fn execute(
    args: &cli::ExecuteArgs,
    verbose: bool,
    show_secrets: bool,
    config_path: Option<&PathBuf>,
) -> Result<(), UpsqlError> {
    let exec_config = config::load_from_execute_args(args, verbose, show_secrets, config_path)?;
    let verbose = exec_config.verbose;

    let sql = resolve_sql(args)?;

    let api_url = match exec_config.api_url {
        Some(ref url) => url.clone(),
        None => {
            verbose::emit(
                verbose,
                &format!("discovering API URL via {}...", exec_config.auth_url),
            );
            auth::discover_base_url(&exec_config.auth_url, &exec_config.token, verbose, show_secrets)
                .await?
        }
    };

    verbose::emit(
        verbose,
        &format!("executing against {} (profile '{}')...", api_url, exec_config.profile),
    );
    let requester = Requester::new(&api_url, TokenFiller::new(&exec_config.token)?)?
        .with_verbose(verbose, show_secrets);
    let executor = QueryExecutor::new(requester).with_verbose(verbose);

    let timer = Timer::start();
    let mut pages = executor.execute(&sql, exec_config.timeout);
    let mut page_count = 0usize;
    let mut row_count = 0usize;
    while let Some(page) = pages.try_next().await? {
        let rendered = format::render_page(&page, exec_config.output, page_count == 0)?;
        output::print_result(&rendered)?;
        page_count += 1;
        row_count += page.rows.len();
    }

    verbose::emit(
        verbose,
        &format!(
            "query complete ({}ms, {} pages, {} rows)",
            timer.elapsed_ms(),
            page_count,
            row_count
        ),
    );
    Ok(())
}

async fn authenticate(
    args: &cli::AuthenticateArgs,
    verbose: bool,
    show_secrets: bool,
    config_path: Option<&PathBuf>,
) -> Result<(), UpsqlError> {
    let auth_config = config::load_from_authenticate_args(args, verbose, show_secrets, config_path)?;
    let verbose = auth_config.verbose;

    verbose::emit(
        verbose,
        &format!("authenticating {} against {}...", auth_config.email, auth_config.auth_url),
    );
    let settings = auth::authenticate(
        &auth_config.auth_url,
        &auth_config.email,
        &auth_config.password,
        verbose,
        show_secrets,
    )
    .await?;

    config::save_profile(
        &auth_config.config_path,
        &auth_config.profile,
        &settings.token,
        &settings.base_url,
    )?;
    verbose::emit(
        verbose,
        &format!("saved profile to {}", auth_config.config_path.display()),
    );

    output::print_message(&format!(
        "Successfully configured profile '{}' (API token: {}, base url: {})",
        auth_config.profile,
        format_secret(&settings.token, show_secrets),
        settings.base_url
    ));
    Ok(())
}

// --- Helpers ---

fn resolve_sql(args: &cli::ExecuteArgs) -> Result<String, UpsqlError> {
    let sql = if let Some(ref sql) = args.command {
        sql.clone()
    } else if let Some(ref path) = args.file {
        std::fs::read_to_string(path).map_err(|e| UpsqlError::Config {
            message: format!("cannot read SQL file {}: {}", path.display(), e),
        })?
    } else {
        return Err(UpsqlError::Config {
            message: "no SQL provided, use -c <statement> or -f <file>".to_string(),
        });
    };

    let sql = sql.trim();
    if sql.is_empty() {
        return Err(UpsqlError::Config {
            message: "SQL statement is empty".to_string(),
        });
    }
    Ok(sql.to_string())
}
