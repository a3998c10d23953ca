use std::path::Path;

use log::LevelFilter;
use log4rs::{
    append::console::{ConsoleAppender, Target},
    config::{Appender, Root},
    encode::pattern::PatternEncoder,
    Config,
};

const LOG_CONFIG_FILE: &str = "log4rs.yaml";
const LOG_PATTERN: &str = "{d(%H:%M:%S%.3f)} {h({l:<5})} {t} - {m}{n}";

/// Loads `log4rs.yaml` from the working directory, or logs `info` and above to
/// stderr when there is no such file.
pub fn init_logger() {
    let result = if Path::new(LOG_CONFIG_FILE).is_file() {
        log4rs::init_file(LOG_CONFIG_FILE, Default::default()).map_err(|e| e.to_string())
    } else {
        init_console_logger(LevelFilter::Info)
    };
    if let Err(e) = result {
        eprintln!("Logger initialisation failed: {}", e);
    }
}

fn init_console_logger(level: LevelFilter) -> Result<(), String> {
    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
        .build();
    let config = Config::builder()
        .appender(Appender::builder().build("stderr", Box::new(stderr)))
        .build(Root::builder().appender("stderr").build(level))
        .map_err(|e| e.to_string())?;
    log4rs::init_config(config).map_err(|e| e.to_string())?;
    Ok(())
}

#[cfg(test)]
#[ctor::ctor]
fn init_test_logger() {
    // a second logger in the same process is rejected, which is fine here
    let _ = init_console_logger(LevelFilter::Warn);
}
