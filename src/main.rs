use clap::Parser;
use clam::cli::commands::print::Field;
use clam::cli::commands::update::Change;
use clam::cli::{data_dir, Cli, Commands, VaultAction};
use clam::config::Settings;
use clam::errors::Result;
use tracing_subscriber::EnvFilter;

/// Environment variable holding a tracing filter, e.g. `clam=debug`.
const LOG_ENV: &str = "CLAM_LOG";

fn main() {
    let cli = Cli::parse();

    let settings = match Settings::load(&data_dir(&cli)) {
        Ok(settings) => settings,
        Err(e) => {
            clam::cli::output::error(&e.to_string());
            std::process::exit(1);
        }
    };

    init_tracing(cli.debug || settings.debug);

    if let Err(e) = run(&cli, &settings) {
        clam::cli::output::error(&e.to_string());
        std::process::exit(1);
    }
}

/// Install a stderr subscriber when debugging is requested or a filter
/// is set in the environment.  Otherwise the library stays silent.
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("clam=debug")
    } else {
        match EnvFilter::try_from_env(LOG_ENV) {
            Ok(filter) => filter,
            Err(_) => return,
        }
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn run(cli: &Cli, settings: &Settings) -> Result<()> {
    use clam::cli::commands::*;

    match cli.command {
        Commands::Vault { ref action } => match action {
            VaultAction::Add { name } => vault_add::execute(cli, settings, name),
            VaultAction::Update { new_key } => {
                vault_update::execute(cli, settings, new_key.as_deref())
            }
            VaultAction::Switch { name } => vault_switch::execute(cli, settings, name),
            VaultAction::Delete { name, force } => {
                vault_delete::execute(cli, settings, name, *force)
            }
            VaultAction::List { accounts, info } => {
                vault_list::execute(cli, settings, *accounts, *info)
            }
        },
        Commands::Add {
            ref tag,
            ref username,
            ref password,
            ref file,
        } => add::execute(
            cli,
            settings,
            tag,
            username.as_deref(),
            password.as_deref(),
            file.as_deref(),
        ),
        Commands::Print {
            ref tag,
            username,
            password,
            note,
        } => {
            let field = if username {
                Field::Username
            } else if password {
                Field::Password
            } else if note {
                Field::Note
            } else {
                Field::All
            };
            print::execute(cli, settings, tag, field)
        }
        Commands::Clip { ref tag, password, .. } => clip::execute(cli, settings, tag, password),
        Commands::Update {
            ref tag,
            ref username,
            ref password,
            ref note,
            ref file,
            delete,
        } => {
            let change = if delete {
                Change::Delete
            } else if let Some(path) = file {
                Change::File(path.clone())
            } else if let Some(u) = username {
                Change::Username(u.clone())
            } else if let Some(p) = password {
                Change::Password(p.clone())
            } else if let Some(n) = note {
                Change::Note(n.clone())
            } else {
                // Unreachable: clap requires one member of the group.
                return Err(clam::errors::ClamError::CommandFailed(
                    "nothing to update".into(),
                ));
            };
            update::execute(cli, settings, tag, change)
        }
    }
}
