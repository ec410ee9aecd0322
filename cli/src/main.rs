//! CLI entrypoint for wikiscript
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, anyhow, bail};
use clap::{CommandFactory, Parser};
use futures::future::join_all;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use wikiscript_application::{
    InvocationRequest, InvokeModuleUseCase, PageRender, RenderPageUseCase, ScriptEnginePort,
    SourceResolverPort, ValidateModuleUseCase,
};
use wikiscript_domain::MODULE_NAMESPACE;
use wikiscript_infrastructure::{ConfigLoader, DirectorySourceResolver, FileConfig};
use wikiscript_presentation::{
    Cli, Command, ConsoleFormatter, HostFormatter, JsonFormatter, OutputFormat, OutputFormatter,
};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Keep the guard alive so buffered log lines are flushed on exit
    let _log_guard = init_logging(cli.verbose, cli.log_file.as_deref())?;

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_ref());
        return Ok(ExitCode::SUCCESS);
    }

    let Some(command) = cli.command.clone() else {
        Cli::command().print_help()?;
        return Ok(ExitCode::FAILURE);
    };

    let config = load_config(&cli)?;
    let engine_config = config.to_engine_config();
    info!(
        modules = %config.modules.directory.display(),
        max_calls = engine_config.quota.max_calls,
        "Starting wikiscript"
    );

    // === Dependency Injection ===
    let engine = script_engine();
    let resolver: Arc<dyn SourceResolverPort> =
        Arc::new(DirectorySourceResolver::new(&config.modules.directory));
    let formatter = formatter(cli.format);
    let render_page = RenderPageUseCase::new(
        Arc::clone(&engine),
        InvokeModuleUseCase::new(resolver),
        engine_config.quota.clone(),
    );

    match command {
        Command::Invoke {
            module,
            function,
            args,
        } => {
            let request = match function {
                Some(function) => InvocationRequest::named(module, function, args),
                None => InvocationRequest::main(module, args),
            };
            let render = render_page.execute("invoke", &[request])?;
            let ok = render.failures() == 0;
            for output in &render.outputs {
                println!("{}", formatter.invocation(output));
            }
            if cli.verbose > 0 {
                eprintln!("{}", formatter.limits(&render.limits));
            }
            Ok(exit_code(ok))
        }

        Command::Validate { file, name } => {
            let source = std::fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let name = name.unwrap_or_else(|| display_name_for(&file));
            let report = ValidateModuleUseCase::new(engine).validate(&source, &name);

            match formatter.validation(&report) {
                Some(output) => println!("{}", output),
                None => println!("{}: no syntax errors", name),
            }
            Ok(exit_code(report.is_valid()))
        }

        Command::Render { pages } => {
            let renders = render_pages(render_page, pages, engine_config.render_workers).await;

            let mut ok = true;
            for (page, render) in renders {
                match render {
                    Ok(render) => {
                        ok &= render.failures() == 0;
                        print_page(formatter.as_ref(), cli.format, &page, &render);
                    }
                    Err(e) => {
                        ok = false;
                        error!(page = %page.display(), "Render failed: {:#}", e);
                    }
                }
            }
            Ok(exit_code(ok))
        }
    }
}

/// Initialize logging based on verbosity level.
///
/// With `--log-file`, logs go to that file through a non-blocking writer;
/// otherwise to stderr.
fn init_logging(verbose: u8, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let filter = match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    match log_file {
        Some(path) => {
            let directory = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(Path::new("."));
            let file_name = path
                .file_name()
                .ok_or_else(|| anyhow!("--log-file must name a file: {}", path.display()))?;
            let appender = tracing_appender::rolling::never(directory, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);

            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_ansi(false)
                .with_writer(writer)
                .init();
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
            Ok(None)
        }
    }
}

fn load_config(cli: &Cli) -> Result<FileConfig> {
    let mut config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref()).map_err(|e| anyhow!("invalid configuration: {}", e))?
    };

    if let Some(directory) = &cli.modules {
        config.modules.directory = directory.clone();
    }

    let issues = config.validate();
    for issue in &issues {
        if issue.is_error() {
            error!("{}", issue);
        } else {
            warn!("{}", issue);
        }
    }
    if let Some(issue) = issues.iter().find(|i| i.is_error()) {
        bail!("invalid configuration: {}", issue.message);
    }

    Ok(config)
}

#[cfg(feature = "scripting")]
fn script_engine() -> Arc<dyn ScriptEnginePort> {
    Arc::new(wikiscript_infrastructure::LuaScriptEngine::new())
}

#[cfg(not(feature = "scripting"))]
fn script_engine() -> Arc<dyn ScriptEnginePort> {
    warn!("Built without the `scripting` feature; modules cannot run");
    Arc::new(wikiscript_application::NoScriptEngine)
}

fn formatter(format: OutputFormat) -> Box<dyn OutputFormatter> {
    match format {
        OutputFormat::Text => Box::new(ConsoleFormatter),
        OutputFormat::Html => Box::new(HostFormatter),
        OutputFormat::Json => Box::new(JsonFormatter),
    }
}

fn exit_code(ok: bool) -> ExitCode {
    if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}

/// `Module:<file stem>`, the title a module file would have on the wiki.
fn display_name_for(file: &Path) -> String {
    let stem = file
        .file_stem()
        .map(|s| s.to_string_lossy().replace('_', " "))
        .unwrap_or_else(|| file.display().to_string());
    format!("{}:{}", MODULE_NAMESPACE, stem)
}

fn read_page(path: &Path) -> Result<Vec<InvocationRequest>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read page {}", path.display()))?;
    Ok(text.lines().filter_map(InvocationRequest::parse_line).collect())
}

/// Render every page in its own session, at most `workers` at a time.
///
/// Sessions run Lua synchronously, so each page is rendered on the blocking
/// pool. Results come back in input order.
async fn render_pages(
    render_page: RenderPageUseCase,
    pages: Vec<PathBuf>,
    workers: usize,
) -> Vec<(PathBuf, Result<PageRender>)> {
    let permits = Arc::new(Semaphore::new(workers.max(1)));

    let tasks = pages.into_iter().map(|page| {
        let render_page = render_page.clone();
        let permits = Arc::clone(&permits);
        async move {
            let result = async {
                let _permit = permits.acquire_owned().await?;
                let requests = read_page(&page)?;
                let name = page.display().to_string();
                tokio::task::spawn_blocking(move || render_page.execute(&name, &requests))
                    .await
                    .map_err(|e| anyhow!("render task failed: {}", e))?
                    .map_err(anyhow::Error::from)
            }
            .await;
            (page, result)
        }
    });

    join_all(tasks).await
}

fn print_page(formatter: &dyn OutputFormatter, format: OutputFormat, page: &Path, render: &PageRender) {
    if format == OutputFormat::Text {
        println!("{}", ConsoleFormatter::page_header(&page.display().to_string()));
    }
    for output in &render.outputs {
        println!("{}", formatter.invocation(output));
    }
    println!("{}", formatter.limits(&render.limits));
}
