use std::{fs, path::Path, process::ExitCode};

use mushroom_classify::{
    app::{Classifier, Outcome, Report},
    cli::{MushcArgs, init_tracing},
    config::ClassLabelSet,
    errors::{ClassifyError, InvalidInputError},
    providers::onnx::{
        OnnxArtefact, OnnxImageClassifier, OnnxImageConfig, OnnxTabularClassifier,
        OnnxTabularConfig,
    },
    tabular::TabularInputRecord,
};
use ortho_config::OrthoConfig;

fn main() -> ExitCode {
    let args = match MushcArgs::load() {
        Ok(args) => args,
        Err(err) => {
            eprintln!("mushc: {err}");
            return ExitCode::from(2);
        }
    };
    init_tracing(args.log_level.as_deref());

    if !args.has_work() {
        eprintln!("mushc: nothing to classify; pass --traits and/or --image");
        return ExitCode::from(2);
    }

    let report = classify(&args);
    for failure in report.failures() {
        eprintln!("mushc: {failure}");
    }
    if args.json {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{json}"),
            Err(err) => {
                eprintln!("mushc: failed to serialise report: {err}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        let text = report.render_text();
        if !text.is_empty() {
            println!("{text}");
        }
    }

    if report.has_failures() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn classify(args: &MushcArgs) -> Report {
    let labels = ClassLabelSet::default();
    let class_count = labels.len();
    let classifier: Classifier<OnnxTabularClassifier, OnnxImageClassifier> =
        Classifier::new(labels);

    let tabular = args.traits.as_deref().map(|traits| {
        let result = TabularInputRecord::parse_pairs(traits)
            .map_err(ClassifyError::from)
            .and_then(|record| {
                let path = args.tabular_model_path();
                let config = OnnxTabularConfig::per_column(OnnxArtefact {
                    path: path.clone(),
                    sha256: args.tabular_sha256.clone(),
                });
                classifier.classify_traits(
                    &path,
                    |_| OnnxTabularClassifier::new(config),
                    &record,
                )
            });
        Outcome::from_result("tabular", result)
    });

    let image = args.image.as_deref().map(|photo| {
        let result = read_photo(photo).and_then(|bytes| {
            let path = args.image_model_path();
            let config = OnnxImageConfig {
                model: OnnxArtefact {
                    path: path.clone(),
                    sha256: args.image_sha256.clone(),
                },
                input_name: None,
                output_name: None,
                class_count,
            };
            classifier.classify_photo(
                &path,
                |_| OnnxImageClassifier::new(config),
                &bytes,
            )
        });
        Outcome::from_result("image", result)
    });

    Report { tabular, image }
}

fn read_photo(path: &Path) -> Result<Vec<u8>, ClassifyError> {
    fs::read(path).map_err(|source| {
        ClassifyError::from(InvalidInputError::UnreadableImage {
            path: path.to_path_buf(),
            source,
        })
    })
}
