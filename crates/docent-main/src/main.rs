use docent_lib::output::StdIO;

fn main() -> anyhow::Result<()> {
    // 1. Pick up GROQ_API_KEY and friends from a local .env, if present
    dotenv::dotenv().ok();

    // 2. Set panic hook (logs if a subscriber is installed, always prints to stderr)
    std::panic::set_hook(Box::new(|info| {
        tracing::error!("{info}");
        eprintln!("{info}");
    }));

    // 3. Run CLI; logging is initialized once the arguments are parsed
    let args: Vec<String> = std::env::args().collect();
    let args_refs: Vec<&str> = args.iter().map(String::as_str).collect();
    let mut io = StdIO::new();

    let result = docent_cli::try_run(&args_refs, &mut io);
    if let Err(ref e) = result {
        tracing::error!(error = format!("{e:?}"), "docent failed");
    }
    result
}
