//! Launcher metadata generator CLI entrypoint.
//!
//! This binary runs one generation step per invocation. Any failure is logged
//! and turned into exit status 1 so the invoking build fails.

use camino::Utf8Path;
use clap::Parser;
use launchermeta::cli::{Cli, Command, ExportCnlArgs, StagingArgs};
use launchermeta::cnl::{ExportRequest, export_manifest, write_manifest};
use launchermeta::config::GeneratorConfig;
use launchermeta::dependencies::load_dependencies;
use launchermeta::error::Result;
use launchermeta::registry::updater::update_registry;
use launchermeta::repository::{HttpProbe, RepositoryResolver};
use launchermeta::staging::{prepare_staging, verify_staging};
use log::{error, info};

fn main() {
    let cli = Cli::parse();
    init_logging(&cli);
    let exit_code = exit_code_for_run_result(run(&cli));
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

fn init_logging(cli: &Cli) {
    let default = cli.log_level().to_string().to_lowercase();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp(None)
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    let config = GeneratorConfig::load(&cli.config)?;
    match &cli.command {
        Command::ExportCnl(args) => export_cnl(&config, args),
        Command::UpdateRegistry => {
            update_registry(&config.modules, &config.product, config.algorithm()).map(drop)
        }
        Command::PrepareStaging(args) => stage(&config, args),
        Command::PostBuild(args) => {
            update_registry(&config.modules, &config.product, config.algorithm())?;
            stage(&config, args)
        }
        Command::VerifyStaging => {
            verify_staging(
                &config.staging,
                &config.modules.registry_path,
                config.algorithm(),
            )?;
            info!("staging directory {} verified", config.staging.directory);
            Ok(())
        }
    }
}

fn export_cnl(config: &GeneratorConfig, args: &ExportCnlArgs) -> Result<()> {
    let dependencies = load_dependencies(&args.dependencies)?;
    let probe = HttpProbe::new(&config.probe);
    let resolver = RepositoryResolver::new(&probe);
    let request = ExportRequest {
        product: &config.product,
        algorithm: config.algorithm(),
        repositories: &config.repositories,
        dependencies: &dependencies,
    };
    let manifest = export_manifest(&request, &resolver)?;
    write_manifest(&args.output, &manifest)?;
    info!("wrote {}", args.output);
    Ok(())
}

fn stage(config: &GeneratorConfig, args: &StagingArgs) -> Result<()> {
    let registry: &Utf8Path = &config.modules.registry_path;
    let inputs = args.clone().into_inputs(registry.to_owned());
    prepare_staging(&inputs, &config.staging, &config.product, config.algorithm()).map(drop)
}

fn exit_code_for_run_result(result: Result<()>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            error!("{err}");
            1
        }
    }
}
