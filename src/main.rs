use cabkit::cli::{Cli, Commands};
use clap::Parser;
use miette::Result;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior (terminate silently) for proper Unix piping.
    // Without this, piping to `head`, `grep -q`, etc. causes a panic on broken pipe.
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;
    init_logging(global.verbose);

    match cli.command {
        Commands::Init(args) => cabkit::cli::commands::init::run(args, &global),
        Commands::Calc(cmd) => cabkit::cli::commands::calc::run(cmd, &global),
        Commands::Bom(cmd) => cabkit::cli::commands::bom::run(cmd, &global),
        Commands::Project(cmd) => cabkit::cli::commands::project::run(cmd, &global),
        Commands::Standards(cmd) => cabkit::cli::commands::standards::run(cmd, &global),
        Commands::Config(cmd) => cabkit::cli::commands::config::run(cmd, &global),
        Commands::Completions(args) => cabkit::cli::commands::completions::run(args),
    }
}

/// Log to stderr; CABKIT_LOG (or RUST_LOG) wins over -v
fn init_logging(verbose: bool) {
    let default = if verbose { "cabkit=debug" } else { "cabkit=warn" };
    let filter = std::env::var("CABKIT_LOG")
        .ok()
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
