use ascii_reel::cli::Cli;
use ascii_reel::pipeline::run;
use clap::Parser;

fn main() {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level)
        .init();

    let result = cli.pipeline_config().and_then(|config| {
        let stats = run(&config)?;
        log::info!(
            "{} frames from {:.3}s of video at {} fps",
            stats.frames_rendered,
            stats.duration_secs,
            stats.fps
        );
        println!("ASCII animation generated and saved to {}", config.output.display());
        Ok(())
    });

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
