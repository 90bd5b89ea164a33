use clap::Parser;
use servereye::cli::{
    alerts, auth, handle_completions, handle_config_init, snapshot, watch, AlertsCommands,
    AuthCommands, Cli, Commands, ConfigCommands,
};

fn print_output(
    result: Result<String, Box<dyn std::error::Error>>,
) -> Result<(), Box<dyn std::error::Error>> {
    let output = result?;
    println!("{}", output);
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Watch(args) => watch::run_watch(args).await,
        Commands::Snapshot(args) => print_output(snapshot::handle_snapshot(&args).await),
        Commands::Alerts(cmd) => match cmd {
            AlertsCommands::List(args) => print_output(alerts::handle_alerts_list(&args).await),
            AlertsCommands::Ack(args) => print_output(alerts::handle_alerts_ack(&args).await),
        },
        Commands::Auth(cmd) => match cmd {
            AuthCommands::Login(args) => print_output(auth::handle_auth_login(&args)),
            AuthCommands::Logout(args) => print_output(auth::handle_auth_logout(&args)),
        },
        Commands::Config(config_cmd) => match config_cmd {
            ConfigCommands::Init(args) => handle_config_init(&args),
        },
        Commands::Completions(args) => {
            handle_completions(&args);
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
