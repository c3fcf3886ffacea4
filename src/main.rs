use anyhow::Result;
use dbdrawer::config::Config;
use dbdrawer::logger::Logger;
use dbdrawer::ui;

#[tokio::main]
async fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    if let Some(arg) = args.next() {
        match arg.as_str() {
            "--generate-config" => {
                let path = match args.next() {
                    Some(path) => path.into(),
                    None => Config::get_default_config_path()?,
                };
                return Config::generate_default_config(path);
            }
            "--help" | "-h" => {
                println!("Usage: dbdrawer [--generate-config [PATH]]");
                return Ok(());
            }
            other => anyhow::bail!("Unknown argument '{}'. Try --help", other),
        }
    }

    let config = Config::load()?;
    let logger = Logger::from_config(&config.logging)?;
    logger.install(config.logging.level_filter()?)?;
    log::info!("starting dbdrawer");

    ui::run_app(config, logger).await
}
