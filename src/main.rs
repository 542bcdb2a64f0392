use clap::Parser;
use cube_scene::app::{App, AppStatus};
use cube_scene::cli::Cli;
use cube_scene::config::Settings;
use winit::event_loop::EventLoop;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let settings = Settings::resolve(&cli)?;
    log::debug!("Settings: {:?}", settings);

    let event_loop = EventLoop::new()?;
    let mut app = App::new(settings);

    event_loop.run_app(&mut app)?;

    match app.status() {
        AppStatus::Failed(message) => anyhow::bail!("{message}"),
        // The fallback message has already been shown
        AppStatus::Unsupported(_) | AppStatus::Starting | AppStatus::Running => Ok(()),
    }
}
