use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use tasklist::api::{check_health, HEALTH_TIMEOUT};
use tasklist::{logging, ui, Config, HttpTodoApi, TaskListClient};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;
    let _log_guard = logging::init(&config.log_file)?;

    info!(base_url = %config.base_url, "Starting task list client");
    let api = HttpTodoApi::new(config.base_url.clone())?;

    // Diagnostics only; never holds up the first draw
    let probe = api.clone();
    tokio::spawn(async move {
        match check_health(&probe, HEALTH_TIMEOUT).await {
            Ok(health) => info!(status = %health.status, redis = health.redis, "Task service reachable"),
            Err(err) => warn!(error = %err, "Task service health check failed"),
        }
    });
    let mut client = TaskListClient::new(api);

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = ui::run_app(&mut terminal, &mut client).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        eprintln!("{:?}", err);
    }
    Ok(())
}
