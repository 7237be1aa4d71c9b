use clap::Parser;

#[derive(Parser)]
#[command(name = "echo-cli")]
#[command(about = "Client for the fanout-echo service", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    /// Number of workers; the server default applies when omitted.
    #[arg(short, long)]
    count: Option<usize>,

    /// Text to echo.
    input: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut request = client.post(format!("{}/echo", cli.url)).body(cli.input);
    if let Some(count) = cli.count {
        request = request.query(&[("count", count)]);
    }
    let res = request.send().await?;

    let status = res.status();
    let text = res.text().await?;
    if !status.is_success() {
        eprintln!("Error: server returned status {}", status);
        eprint!("{}", text);
        std::process::exit(1);
    }

    print!("{}", text);
    Ok(())
}
