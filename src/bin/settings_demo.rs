use keyward::settings::*;

fn main() -> anyhow::Result<()> {
    // $ cargo run --bin settings_demo -- --settings=settings/dev.toml
    let cli = Cli::parse();
    let project_settings = parse_settings(cli.settings.as_deref())?;
    println!("Loaded settings: {:?}", project_settings);
    println!(
        "access ttl: {:?}, refresh ttl: {:?}",
        project_settings.token.access_ttl(),
        project_settings.token.refresh_ttl()
    );
    for setting in project_settings.token.default_secrets() {
        println!("default secret in use: {}", setting);
    }

    // $ KEYWARD__TOKEN__ACCESS_TTL=5m cargo run --bin settings_demo
    let is_err = parse_settings(Some("")).is_err();
    println!("Error on invalid path: {:?}", is_err);

    Ok(())
}
