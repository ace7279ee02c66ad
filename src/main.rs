use clap::Parser;
use fdb::cli::{Cli, Commands};
use fdb::core::Config;
use miette::Result;

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

    let config = Config::load(global.project.as_deref());
    fdb::logging::init(config.log_level(), global.verbose);

    match cli.command {
        Commands::Init(args) => fdb::cli::commands::init::run(args),
        Commands::Flights(args) => fdb::cli::commands::flights::run(args, &global),
        Commands::Aircraft(cmd) => fdb::cli::commands::aircraft::run(cmd, &global),
        Commands::Settings(cmd) => fdb::cli::commands::settings::run(cmd, &global),
        Commands::User(cmd) => fdb::cli::commands::user::run(cmd, &global),
        Commands::Db(cmd) => fdb::cli::commands::db::run(cmd, &global),
        Commands::Config(cmd) => fdb::cli::commands::config::run(cmd, &global),
        Commands::Completions(args) => fdb::cli::commands::completions::run(args),
    }
}
