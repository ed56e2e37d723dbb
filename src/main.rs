use relm4::prelude::*;
use whirl::config;
use whirl::gui::app::AppModel;
use whirl::gui::wheel::WheelState;
use whirl::sys::runtime;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    match config::write_default_config() {
        Ok(path) => log::debug!("Using config at {}", path.display()),
        Err(e) => log::warn!("Could not write default config: {}", e),
    }

    let config = config::load_or_setup();
    let state = WheelState::from_config(&config);

    let (tx, rx) = async_channel::bounded(32);

    // Start Background Services
    runtime::start_background_services(tx);

    let app = RelmApp::new("org.whirl.Whirl");

    app.run::<AppModel>((state, rx));
    Ok(())
}
