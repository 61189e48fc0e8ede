use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use gtasks::commands::{self, DocsOptions, MlServerOptions, RunOptions, checks, docs, issues, project, setup};
use gtasks::error_fmt::{AppError, IoResultExt, SettingsResultExt};
use gtasks::gh::IssueFilter;
use gtasks::{Config, DEFAULT_CONFIG_FILE, SystemRunner, TaskContext, TerminalPrompter};

#[derive(Parser)]
#[command(name = "gtasks")]
#[command(about = "Interactive git and gh helpers for structured commits, issues and project jobs")]
struct Cli {
    /// Config file
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,
    /// Log every external command (overridden by GTASKS_LOG)
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Stage, commit and push, then optionally open a pull request
    Gacp,
    /// Issue branches
    Branch {
        #[command(subcommand)]
        command: BranchCommand,
    },
    /// List, file and close issues
    Issues {
        #[command(subcommand)]
        command: IssuesCommand,
    },
    /// One-off repository setup
    Setup {
        #[command(subcommand)]
        command: SetupCommand,
    },
    /// Docker image and MLflow server
    Containers {
        #[command(subcommand)]
        command: ContainersCommand,
    },
    /// Requirements, environments and MLflow jobs
    Project {
        #[command(subcommand)]
        command: ProjectCommand,
    },
    /// API documentation with pdoc
    Docs {
        #[command(subcommand)]
        command: DocsCommand,
    },
    /// Code checks with ruff, mypy, pytest and bandit
    Checks {
        #[command(subcommand)]
        command: ChecksCommand,
    },
}

#[derive(Subcommand)]
enum BranchCommand {
    /// Create a branch for an issue, named after its first label
    New {
        /// Issue number (prompted when omitted)
        #[arg(long)]
        issue_id: Option<String>,
    },
}

#[derive(Subcommand)]
enum IssuesCommand {
    /// List open issues
    List {
        /// @me, all-open, none, or a login
        #[arg(long, default_value = "@me")]
        assignee: String,
    },
    /// File a new issue
    New,
    /// Close an issue and optionally delete the current branch
    Close {
        /// Issue number (picked from your issues when omitted)
        #[arg(long)]
        issue_id: Option<String>,
    },
}

#[derive(Subcommand)]
enum SetupCommand {
    /// Replace the repository labels with the standard set
    Labels,
    /// Push submodule commits together with the superproject
    Submodule,
}

/// Flags shared by `containers run` and `containers all`
#[derive(Args, Clone)]
struct RunArgs {
    /// Image tag
    #[arg(long)]
    tag: Option<String>,
    /// Port to publish
    #[arg(long)]
    port: Option<u16>,
    /// GPUs to expose
    #[arg(long)]
    gpus: Option<String>,
    /// Host directory to mount
    #[arg(long)]
    source: Option<String>,
    /// Mount point inside the container
    #[arg(long)]
    dest: Option<String>,
    /// Open http://localhost:<port> afterwards
    #[arg(long)]
    open: bool,
}

impl From<RunArgs> for RunOptions {
    fn from(args: RunArgs) -> Self {
        RunOptions {
            tag: args.tag,
            port: args.port,
            gpus: args.gpus,
            source: args.source,
            dest: args.dest,
            open: args.open,
        }
    }
}

#[derive(Subcommand)]
enum ContainersCommand {
    /// Build the project image
    Build {
        /// Image tag
        #[arg(long)]
        tag: Option<String>,
    },
    /// Run the project image
    Run(RunArgs),
    /// Serve MLflow runs from a container
    Mlserver {
        /// Runs directory, relative to the project
        #[arg(long)]
        source: Option<String>,
        /// Mount point inside the container
        #[arg(long)]
        dest: Option<String>,
        /// Port to publish
        #[arg(long)]
        port: Option<u16>,
        /// MLflow image version
        #[arg(long)]
        mlflow_version: Option<String>,
        /// Open the MLflow UI in the browser
        #[arg(long)]
        open: bool,
    },
    /// Build, then run
    All(RunArgs),
}

#[derive(Subcommand)]
enum ProjectCommand {
    /// Export requirements.txt
    Requirements,
    /// Export python_env.yaml
    Environment,
    /// Run an MLflow job from confs/<job>.yaml
    Run {
        job: String,
    },
}

/// Flags shared by the docs commands
#[derive(Args, Clone)]
struct DocsArgs {
    /// Package under src/
    package: String,
    /// Docstring format
    #[arg(long)]
    format: Option<String>,
    /// Output directory
    #[arg(long)]
    output_dir: Option<String>,
    /// Port to serve on
    #[arg(long)]
    port: Option<u16>,
}

impl DocsArgs {
    fn options(&self) -> DocsOptions {
        DocsOptions {
            format: self.format.clone(),
            output_dir: self.output_dir.clone(),
            port: self.port,
        }
    }
}

#[derive(Subcommand)]
enum DocsCommand {
    /// Generate the API docs
    Api(DocsArgs),
    /// Serve the API docs
    Serve(DocsArgs),
    /// Regenerate, then serve
    All(DocsArgs),
}

#[derive(Subcommand)]
enum ChecksCommand {
    /// ruff format --check
    Format,
    /// mypy
    Type,
    /// ruff check
    Code,
    /// pytest
    Test,
    /// bandit
    Security,
    /// pytest with a coverage floor
    Coverage,
    /// Every check but plain tests
    All,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprint!("{}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "gtasks=debug" } else { "gtasks=info" };
    let filter = EnvFilter::try_from_env("GTASKS_LOG").unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time(),
        )
        .with(filter)
        .init();
}

fn run(cli: Cli) -> Result<(), AppError> {
    let config = Config::load(&cli.config).with_config_path(&cli.config.display().to_string())?;
    let root = std::env::current_dir().with_context("failed to read the current directory")?;
    let runner = SystemRunner;
    let mut prompter = TerminalPrompter::stdio();
    let mut ctx = TaskContext::new(&config, &runner, &mut prompter).with_root(&root);

    match cli.command {
        Commands::Gacp => commands::gacp(&mut ctx),
        Commands::Branch { command } => match command {
            BranchCommand::New { issue_id } => commands::new_branch(&mut ctx, issue_id.as_deref()),
        },
        Commands::Issues { command } => match command {
            IssuesCommand::List { assignee } => issues::list(&ctx, &IssueFilter::parse(&assignee)),
            IssuesCommand::New => issues::new_issue(&mut ctx),
            IssuesCommand::Close { issue_id } => issues::close(&mut ctx, issue_id.as_deref()),
        },
        Commands::Setup { command } => match command {
            SetupCommand::Labels => setup::labels(&ctx),
            SetupCommand::Submodule => setup::submodule(&ctx),
        },
        Commands::Containers { command } => match command {
            ContainersCommand::Build { tag } => commands::containers::build(&ctx, tag.as_deref()),
            ContainersCommand::Run(args) => commands::containers::run(&ctx, &args.into()),
            ContainersCommand::Mlserver {
                source,
                dest,
                port,
                mlflow_version,
                open,
            } => commands::containers::mlserver(
                &ctx,
                &MlServerOptions {
                    source,
                    dest,
                    port,
                    mlflow_version,
                    open,
                },
            ),
            ContainersCommand::All(args) => commands::containers::all(&ctx, &args.into()),
        },
        Commands::Project { command } => match command {
            ProjectCommand::Requirements => project::requirements(&ctx),
            ProjectCommand::Environment => project::environment(&ctx),
            ProjectCommand::Run { job } => project::run(&ctx, &job),
        },
        Commands::Docs { command } => match command {
            DocsCommand::Api(args) => docs::api(&ctx, &args.package, &args.options()),
            DocsCommand::Serve(args) => docs::serve(&ctx, &args.package, &args.options()),
            DocsCommand::All(args) => docs::all(&ctx, &args.package, &args.options()),
        },
        Commands::Checks { command } => match command {
            ChecksCommand::Format => checks::format(&ctx),
            ChecksCommand::Type => checks::types(&ctx),
            ChecksCommand::Code => checks::code(&ctx),
            ChecksCommand::Test => checks::test(&ctx),
            ChecksCommand::Security => checks::security(&ctx),
            ChecksCommand::Coverage => checks::coverage(&ctx),
            ChecksCommand::All => checks::all(&ctx),
        },
    }
}
