use std::process::ExitCode;

use mushroom_classify::{
    cli::{PruneArgs, init_tracing},
    prune::prune,
};
use ortho_config::OrthoConfig;
use rand::{SeedableRng, rngs::StdRng};

fn main() -> ExitCode {
    let args = match PruneArgs::load() {
        Ok(args) => args,
        Err(err) => {
            eprintln!("prune_images: {err}");
            return ExitCode::from(2);
        }
    };
    init_tracing(args.log_level.as_deref().or(Some("info")));

    let config = args.to_config();
    let mut rng = args
        .seed
        .map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
    match prune(&config, &mut rng) {
        Ok(report) => {
            println!("Images found: {}", report.found);
            if config.dry_run {
                for path in &report.selected {
                    println!("would delete {}", path.display());
                }
                println!("{} images selected (dry run)", report.selected.len());
            } else {
                println!("{} images deleted", report.deleted);
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("prune_images: {err}");
            ExitCode::FAILURE
        }
    }
}
