use scout_cli::{commands::BANNER, CliConfig, Command, Session};
use scout_client::ScoutClient;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config =
        CliConfig::load().map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;
    init_logging(&config);

    let mut stdout = std::io::stdout();
    writeln!(stdout, "{}\n{}\n", BANNER, "=".repeat(40))?;

    let client = ScoutClient::new(config.client_config())?;
    let mut session = Session::start(client, &config.user_id, config.argument_mode).await?;
    tracing::debug!(thread_id = %session.thread_id(), server = %config.server_url, "Session ready");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        write!(stdout, "User: ")?;
        stdout.flush()?;

        // End of input quits like `exit`
        let Some(line) = lines.next_line().await? else {
            writeln!(stdout)?;
            break;
        };

        match Command::parse(&line) {
            Command::Exit => break,
            Command::Empty => continue,
            Command::History => session.show_history(&mut stdout).await?,
            Command::Save => session.save(&mut stdout).await?,
            Command::Message(content) => {
                session.send(&content, &mut stdout).await?;
            }
        }
    }

    Ok(())
}

/// Logs go to stderr so the transcript on stdout stays clean
fn init_logging(config: &CliConfig) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
