//! Document database compatibility harness - main entry point.
//!
//! Dispatches CLI subcommands: suite runs, report generation, export, and
//! the read-only results API.

use std::fs::File;
use std::io::{self, BufWriter};
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, web};
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::FmtSubscriber;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use docdb_compat_lib::api;
use docdb_compat_lib::catalog;
use docdb_compat_lib::cli::{Cli, Command, ExportArgs, ReportArgs, RunArgs};
use docdb_compat_lib::config::Config;
use docdb_compat_lib::db::{self, DbPool, MemoryStore, ResultsStore};
use docdb_compat_lib::error::{AppError, AppResult};
use docdb_compat_lib::export::{self, ExportLimits};
use docdb_compat_lib::logcapture::logging_filter;
use docdb_compat_lib::middleware;
use docdb_compat_lib::report;
use docdb_compat_lib::suite::SuiteController;
use docdb_compat_lib::target::MongoTarget;

#[actix_web::main]
async fn main() -> io::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(logging_filter(std::env::var("RUST_LOG").ok().as_deref()))
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }

    let cli = Cli::parse();

    if let Command::Suites = cli.cmd {
        list_suites();
        return Ok(());
    }

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            error!("");
            error!("Please check your environment variables:");
            error!("  - RUST_ENV must be set to 'development' or 'production'");
            error!("  - In production, COMPAT_TARGET_URI and DATABASE_URL must be set");
            error!("  - DATABASE_URL must not point at the system under test");
            std::process::exit(1);
        }
    };

    if config.is_development() {
        warn!("Running in DEVELOPMENT mode - connection defaults are in use");
    }

    let result = match cli.cmd {
        Command::Run(args) => run(&config, args).await,
        Command::Report(args) => generate_report(&config, args).await,
        Command::Export(args) => export_results(&config, args).await,
        Command::Serve => return serve(&config).await,
        Command::Suites => Ok(()),
    };

    match result {
        Ok(()) => Ok(()),
        Err(AppError::NoResults) => {
            eprintln!("No test results found in the results store. Nothing to report.");
            std::process::exit(1);
        }
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    }
}

fn list_suites() {
    for suite in catalog::all_suites("compat_test") {
        println!("{:<20} {} cases", suite.name, suite.cases.len());
    }
}

/// Connect to the results store and bring its schema up to date.
async fn connect_store(config: &Config) -> AppResult<DbPool> {
    let pool = DbPool::new(config).await?;
    info!("Results store connection established");

    db::migrations::run_migrations(&pool).await?;
    Ok(pool)
}

async fn run(config: &Config, args: RunArgs) -> AppResult<()> {
    let suites = catalog::select(&config.target.database, &args.suites)?;

    let store: Box<dyn ResultsStore> = if args.dry_run {
        info!("Dry run: records stay in memory");
        Box::new(MemoryStore::new())
    } else {
        Box::new(connect_store(config).await?)
    };

    info!("========================================");
    info!("  Compatibility run");
    info!("  Platform: {}", config.target.platform);
    info!("  Suites: {}", suites.len());
    info!("========================================");

    for suite in &suites {
        // One connection per suite, closed after its teardown
        let target = match MongoTarget::connect(&config.target).await {
            Ok(target) => target,
            Err(e) => {
                error!(suite = %suite.name, "Could not connect to target: {}", e);
                continue;
            }
        };

        let controller = SuiteController::new(
            &target,
            store.as_ref(),
            &config.target.platform,
            config.search_polling,
        )
        .with_log_dir(config.log_dir.clone());

        let outcome = controller.run(suite).await;
        println!(
            "{:<20} {} passed, {} failed",
            outcome.suite, outcome.passed, outcome.failed
        );

        target.shutdown().await;
    }

    if args.dry_run {
        let generated = report::generate(store.as_ref(), &config.target.platform).await?;
        report::render_console(&generated.report, io::stdout())?;
    }

    Ok(())
}

async fn generate_report(config: &Config, args: ReportArgs) -> AppResult<()> {
    let store = connect_store(config).await?;
    let generated = report::generate(&store, &config.target.platform).await?;

    let dir = args.output.unwrap_or_else(|| config.report_dir.clone());
    let artifacts = report::write_artifacts(&dir, &generated.report, &generated.summary)?;

    report::render_console(&generated.report, io::stdout())?;
    info!("Report written to {}", artifacts.report.display());
    info!("Run summary written to {}", artifacts.summary.display());
    Ok(())
}

async fn export_results(config: &Config, args: ExportArgs) -> AppResult<()> {
    let store = connect_store(config).await?;
    let records = store.all_records().await?;

    let writer = BufWriter::new(File::create(&args.output)?);
    let stats = export::export_records(&records, writer, &ExportLimits::default())?;

    info!(
        "Exported {} records to {} ({} skipped)",
        stats.written,
        args.output.display(),
        stats.skipped
    );
    Ok(())
}

async fn serve(config: &Config) -> io::Result<()> {
    let pool = match connect_store(config).await {
        Ok(pool) => pool,
        Err(e) => {
            error!("Failed to initialize results store: {}", e);
            std::process::exit(1);
        }
    };

    let store: Arc<dyn ResultsStore> = Arc::new(pool);
    let bind_address = config.bind_address();
    let is_development = config.is_development();

    let worker_count = if is_development {
        info!(
            "Starting server at http://{} (4 workers - development mode)",
            bind_address
        );
        4
    } else {
        let cpus = num_cpus::get();
        info!(
            "Starting server at http://{} ({} workers)",
            bind_address, cpus
        );
        cpus
    };

    let server = HttpServer::new(move || {
        // The API is read-only
        let cors = if is_development {
            Cors::default()
                .allowed_origin("http://localhost:3000")
                .allowed_origin("http://127.0.0.1:3000")
                .allowed_methods(vec!["GET", "OPTIONS"])
                .max_age(3600)
        } else {
            Cors::default().allowed_methods(vec!["GET", "OPTIONS"]).max_age(3600)
        };

        App::new()
            .wrap(cors)
            .wrap(middleware::RequestLogger)
            .app_data(web::Data::from(store.clone()))
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", api::ApiDoc::openapi()),
            )
            .service(
                web::scope("/api/v1")
                    .configure(api::configure_health_routes)
                    .configure(api::configure_results_routes),
            )
    });

    server
        .workers(worker_count)
        .bind(&bind_address)?
        .run()
        .await
}
