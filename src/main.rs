mod cli;

use std::error::Error;
use std::process;

use clap::Parser;

use exceedance_service::analysis;
use exceedance_service::config::Config;
use exceedance_service::export;
use exceedance_service::ingest::ObservationSource;
use exceedance_service::ingest::power::{PayloadFile, PowerClient};
use exceedance_service::logging::{self, DataSource, LogLevel};
use exceedance_service::model::AnalysisRequest;
use exceedance_service::variables::{self, VARIABLE_REGISTRY};
use exceedance_service::verify;

use crate::cli::{AnalyzeArgs, Cli, Command, VariablesArgs, VerifyArgs};

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let config = Config::load(cli.config.as_deref())?;

    let level = if cli.verbose { LogLevel::Debug } else { config.logging.level };
    logging::init_logger(level, config.logging.file.as_deref(), config.logging.timestamps);
    logging::debug(DataSource::Config, None, &format!("{:?}", config));

    match cli.command {
        Command::Analyze(args) => run_analyze(&config, args),
        Command::Variables(args) => run_variables(args),
        Command::Verify(args) => run_verify(&config, args),
    }
}

fn run_analyze(config: &Config, args: AnalyzeArgs) -> Result<(), Box<dyn Error>> {
    let request = AnalysisRequest {
        latitude: args.lat,
        longitude: args.lon,
        month: args.month,
        day: args.day,
        window: args.window,
        threshold: args.threshold,
        variable: args.variable,
    };

    let source: Box<dyn ObservationSource> = match &args.payload {
        Some(path) => Box::new(PayloadFile::new(path)),
        None => Box::new(PowerClient::new(&config.source)?),
    };

    let result = analysis::run_analysis(source.as_ref(), &request, &config.analysis)?;

    match &args.output {
        Some(path) => export::write_export(path, &result, args.format)?,
        None => print!("{}", export::render(&result, args.format)?),
    }
    Ok(())
}

fn run_variables(args: VariablesArgs) -> Result<(), Box<dyn Error>> {
    let listed = match args.category {
        Some(category) => variables::by_category(category),
        None => VARIABLE_REGISTRY.iter().collect(),
    };

    for v in listed {
        println!(
            "{:<12} {:<22} {:<8} {:<14} {}",
            v.power_param, v.name, v.unit, v.category.to_string(), v.description
        );
    }
    Ok(())
}

fn run_verify(config: &Config, args: VerifyArgs) -> Result<(), Box<dyn Error>> {
    let client = PowerClient::new(&config.source)?;
    let year = args.year.unwrap_or(config.analysis.end_year);
    let report = verify::verify_all(&client, args.lat, args.lon, year);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", verify::render_report(&report));
    }

    if report.summary.working + report.summary.partial == 0 {
        return Err("no variable returned data at this location".into());
    }
    Ok(())
}
