use asset_gallery::cli::CliOverrides;
use asset_gallery::run_with_overrides;
use env_logger::Env;
use log::error;

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let cli = match CliOverrides::parse_from_env() {
        Ok(parsed) => parsed,
        Err(err) => {
            error!("[cli] {err}");
            std::process::exit(2);
        }
    };
    let report = match pollster::block_on(run_with_overrides(cli)) {
        Ok(report) => report,
        Err(err) => {
            error!("Application error: {err:?}");
            std::process::exit(1);
        }
    };
    match report.summary.to_json_pretty() {
        Ok(json) => println!("{json}"),
        Err(err) => error!("Failed to serialize scene summary: {err}"),
    }
}
