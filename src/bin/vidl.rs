use std::env;

use env_logger::Env;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = env::args().skip(1).collect();

    #[cfg(feature = "cli")]
    {
        let code = vidl::cli::exit_code(&vidl::cli::run(&args).await);
        if code != 0 {
            std::process::exit(code);
        }
    }
    #[cfg(not(feature = "cli"))]
    {
        let _ = args;
        eprintln!("CLI support not compiled in");
        std::process::exit(1);
    }
}
