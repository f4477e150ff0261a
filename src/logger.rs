use std::fs::OpenOptions;

use thiserror::Error;

use data::environment;

#[derive(Debug, Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("logger error: {0}")]
    SetLogger(#[from] log::SetLoggerError),
}

pub fn setup(is_debug: bool) -> Result<(), Error> {
    let mut logger = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}:{} [{}] {}",
                chrono::Local::now().format("%H:%M:%S%.3f"),
                record.level(),
                record.target(),
                message
            ));
        })
        .level(log::LevelFilter::Off)
        .level_for("panic", log::LevelFilter::Error)
        .level_for("data", log::LevelFilter::Trace)
        .level_for("irchelper", log::LevelFilter::Trace);

    if is_debug {
        // stdout carries the replay output
        logger = logger.chain(std::io::stderr());
    } else {
        let data_dir = environment::data_dir();

        if !data_dir.exists() {
            std::fs::create_dir_all(&data_dir)?;
        }

        let log_file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(data_dir.join(environment::LOG_FILE_NAME))?;

        logger = logger.chain(log_file);
    }

    logger.apply()?;

    Ok(())
}
