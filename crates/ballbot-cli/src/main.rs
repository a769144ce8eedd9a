use anyhow::Result;

fn main() -> Result<()> {
    let argv: Vec<String> = std::env::args().collect();
    let args: Vec<&str> = argv.iter().map(|s| s.as_str()).collect();

    ballbot_cli::run_cli_main(&args)
}
