//! CLI command definitions

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for command results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Colored terminal output
    Text,
    /// The HTML the host would embed in the rendered page
    Html,
    /// JSON output
    Json,
}

/// CLI arguments for wikiscript
#[derive(Parser, Debug)]
#[command(name = "wikiscript")]
#[command(author, version, about = "Run wiki modules in a sandboxed Lua engine")]
#[command(long_about = r#"
wikiscript executes the Lua modules behind {{#invoke:Module|function|args}}
page calls, each page render in its own sandbox with call, time and memory
quotas.

Configuration files are loaded from (in priority order):
1. WIKISCRIPT_* environment variables (e.g. WIKISCRIPT_LIMITS__MAX_CALLS=10)
2. --config <path>         Explicit config file
3. ./wikiscript.toml       Project-level config
4. ~/.config/wikiscript/config.toml   Global config

Example:
  wikiscript invoke Greeter hello World
  wikiscript validate modules/Greeter.lua
  wikiscript render pages/*.txt --format html
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Directory holding the module files (overrides modules.directory)
    #[arg(short, long, value_name = "DIR", global = true)]
    pub modules: Option<PathBuf>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Write logs to this file instead of stderr
    #[arg(long, value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Invoke one module function, as {{#invoke:Module|function|args}} would
    Invoke {
        /// Module name, with or without the `Module:` prefix
        module: String,

        /// Function to call (defaults to `main`)
        function: Option<String>,

        /// Positional arguments passed to the function
        args: Vec<String>,
    },

    /// Check module source for syntax errors without running it
    Validate {
        /// Source file to check
        file: PathBuf,

        /// Name used in diagnostics (defaults to the file stem)
        #[arg(long)]
        name: Option<String>,
    },

    /// Render pages; each line of a page file is one `Module|function|arg|...` call
    Render {
        /// Page files, rendered in parallel with one session each
        #[arg(required = true)]
        pages: Vec<PathBuf>,
    },
}
