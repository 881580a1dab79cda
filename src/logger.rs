use simplelog::{Config, LevelFilter, SimpleLogger};

pub fn init(verbose: bool, debug: bool) {
    let level = if debug {
        LevelFilter::Debug
    } else if verbose {
        LevelFilter::Info
    } else {
        LevelFilter::Warn
    };
    let _ = SimpleLogger::init(level, Config::default());
}
