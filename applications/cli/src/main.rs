/// Drive Mental - repeat playback from the command line
use clap::{Parser, Subcommand};
use drive_mental::{config::CliConfig, prefs, session, PlayArgs, PrefsSetArgs};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "drive-mental")]
#[command(about = "Drive Mental repeat playback", long_about = None)]
struct Cli {
    /// Configuration file path (defaults to ./drive-mental.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage stored playback preferences
    Prefs {
        #[command(subcommand)]
        command: PrefsCommand,
    },
    /// Run a simulated listening session
    ///
    /// Preferences are read from the preference file once, when the session
    /// starts. A `prefs set` run from another shell takes effect on the next
    /// `play`, not on a session already running.
    Play(PlayArgs),
}

#[derive(Subcommand)]
enum PrefsCommand {
    /// Print the stored preferences as JSON
    Show,
    /// Update stored preferences
    Set(PrefsSetArgs),
    /// Restore the default preferences
    Reset,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "drive_mental=info,drive_playback=info,drive_storage=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let config = CliConfig::load(cli.config.as_deref())?;
    config.validate()?;

    match cli.command {
        Commands::Prefs { command } => run_prefs(&config, command)?,
        Commands::Play(args) => play(&config, &args).await?,
    }

    Ok(())
}

fn run_prefs(config: &CliConfig, command: PrefsCommand) -> anyhow::Result<()> {
    let mut store = prefs::open_store(config);

    let current = match command {
        PrefsCommand::Show => store.get(),
        PrefsCommand::Set(args) => {
            let update = args.to_update();
            if update.is_empty() {
                tracing::warn!("No preference flags given, nothing to change");
                store.get()
            } else {
                store.update(&update)
            }
        }
        PrefsCommand::Reset => {
            store.reset_to_defaults();
            // The admin pause outranks the defaults
            prefs::apply_admin_pause(&mut store, config.playback.inter_repeat_pause_seconds);
            store.get()
        }
    };

    if !store.is_persistent() {
        tracing::warn!(
            path = %config.storage.preferences_path.display(),
            "Preferences could not be saved, changes last for this run only"
        );
    }

    println!("{}", prefs::render(&current)?);
    Ok(())
}

async fn play(config: &CliConfig, args: &PlayArgs) -> anyhow::Result<()> {
    let options = args.to_options(config.tick_interval())?;
    let store = prefs::open_store(config);

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    let report = session::run_session(&options, store.subscribe(), shutdown).await?;

    println!("{}", serde_json::to_string_pretty(&serde_json::json!({
        "state": report.final_state,
        "completedRepeats": report.completed_repeats,
        "backgroundLoops": report.background_loops,
        "listenedSeconds": report.listened.as_secs_f64(),
        "error": report.error,
    }))?);

    if let Some(error) = report.error {
        anyhow::bail!("session ended with an error: {error}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn play_help_says_when_preferences_are_read() {
        let cli = Cli::command();
        let play = cli.find_subcommand("play").unwrap();
        let help = play.get_long_about().unwrap().to_string();

        assert!(help.contains("once, when the session"));
        assert!(help.contains("next `play`"));
    }

    #[test]
    fn command_line_is_well_formed() {
        Cli::command().debug_assert();
    }
}
