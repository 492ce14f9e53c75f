mod anim;
mod app;
mod config;
mod follower;
mod geometry;
mod platform;
mod render;
mod screen;


fn main() {
    env_logger::init();
    log::info!("{} starting up", config::APP_NAME);

    if let Err(e) = app::run() {
        log::error!("Fatal error: {e}");
        std::process::exit(1);
    }
}
