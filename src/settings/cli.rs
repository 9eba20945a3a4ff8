use super::Parser;

#[derive(Parser, Debug)]
#[command(name = "keyward", about = "Session credential service")]
pub struct Cli {
    /// Path to a TOML settings file.
    #[arg(long)]
    pub settings: Option<String>,
}
