use gatehouse::{logger, AppState, Config};
use log::{error, info, warn};

#[tokio::main]
async fn main() {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Invalid configuration: {}", err);
            std::process::exit(2);
        }
    };

    if let Err(err) = logger::init(config.log_level) {
        eprintln!("Failed to start logger: {}", err);
    }

    info!("Starting gatehouse with database {}", config.db_path.display());

    let state = match AppState::build(config) {
        Ok(state) => state,
        Err(err) => {
            error!("Failed to start: {}", err);
            std::process::exit(1);
        }
    };

    let Some(user) = state.session.user() else {
        info!("No stored session; log in to continue");
        return;
    };

    info!("Restored session for {}", user.email);
    match state.account.profile().await {
        Ok(profile) => info!("Profile refreshed for {}", profile.name),
        Err(err) => warn!("Failed to refresh profile: {}", err),
    }

    for notification in state.notifications.list() {
        info!("[{:?}] {}", notification.severity, notification.text);
    }
}
