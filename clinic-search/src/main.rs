mod app;
mod draw;
mod host;
mod terminal;

use std::fs::File;
use std::io;
use std::time::Duration;

use overlay_core::OverlayEnv;
use simplelog::{Config, LevelFilter, WriteLogger};

use app::{Flow, SearchBar};
use terminal::Terminal;

fn main() -> io::Result<()> {
    let log_file = File::create("clinic-search.log")?;
    WriteLogger::init(LevelFilter::Debug, Config::default(), log_file).map_err(io::Error::other)?;

    let config = host::cell_config();
    config.validate().map_err(io::Error::other)?;

    let env = OverlayEnv::with_config(config);
    env.scroll_lock
        .on_change(|locked| log::info!("[clinic-search] page scroll locked={}", locked));

    let mut term = Terminal::new()?;
    let (width, height) = term.size()?;
    let mut bar = SearchBar::new(env, width, height);
    log::info!("[clinic-search] started {}x{}", width, height);

    loop {
        bar.frame();
        draw::draw(term.out(), &bar)?;

        for event in term.poll(Duration::from_millis(100))? {
            if bar.handle(&event) == Flow::Quit {
                log::info!("[clinic-search] quit");
                return Ok(());
            }
        }
    }
}
