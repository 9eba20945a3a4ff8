use keyward::logger::*;

fn main() -> anyhow::Result<()> {
    let logger = Logger::try_bootstrap()?;
    trace!("bootstrap trace log");
    debug!("bootstrap debug log");
    info!("bootstrap info log");

    let config = LogConfig {
        filter: "keyward=trace,debug".to_string(),
    };
    logger.reload_from_config(&config)?;
    trace!("application trace log");
    debug!(user_id = 7, "application debug log");
    info!("application info log");

    Ok(())
}
