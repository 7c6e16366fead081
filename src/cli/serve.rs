use crate::{api::AppState, cli::load_settings, error, info, server};

pub async fn serve() {
    let settings = load_settings();

    let state = match AppState::from_settings(&settings) {
        Ok(state) => state,
        Err(e) => error!("Cannot set up service clients: {}", e),
    };

    info!("Dashboard at http://{}/", settings.server_address);
    if let Err(e) = server::start_dashboard(settings.server_address, state).await {
        error!("Dashboard stopped: {}", e);
    }
}
