use clap::{Arg, ArgAction, Command};
use log::LevelFilter;
use phishscan::config::NetworkMode;
use phishscan::{read_batch_file, AnyLookups, Classification, Config, Pipeline, SchemaKind};
use std::process;

const DEMO_URLS: &[&str] = &[
    "http://example.com/free-money",
    "https://www.google.com",
    "https://revenue-support.auth22-user.com",
    "https://www.facebook.com",
    "https://www.paypal.com",
    "https://www.linkedin.com",
    "https://www.twitter.com",
    "https://www.instagram.com",
    "ptkgb.co.id",
    "www.customs.ie-charge.info",
    "https://customscharge-tracking-delivery.com/",
    "Anpost-parcelredirect.com",
    "https://customs-ie.com/ie/schedule",
];

#[tokio::main]
async fn main() {
    let matches = Command::new("phishscan")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Heuristic phishing URL classifier")
        .long_about(
            "phishscan derives lexical and network features from URLs, aligns them to a \
             trained model's columns and reports a phishing verdict for each URL.",
        )
        .arg(
            Arg::new("urls")
                .value_name("URL")
                .help("URLs to classify")
                .num_args(0..)
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value("phishscan.yaml"),
        )
        .arg(
            Arg::new("generate-config")
                .long("generate-config")
                .value_name("FILE")
                .help("Generate a default configuration file")
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("batch")
                .short('b')
                .long("batch")
                .value_name("FILE")
                .help("Classify URLs listed one per line in FILE")
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("demo")
                .long("demo")
                .help("Classify the built-in list of sample URLs")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("schema")
                .short('s')
                .long("schema")
                .value_name("SCHEMA")
                .help("Feature schema: risk-polarity or count-rate")
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("model")
                .short('m')
                .long("model")
                .value_name("FILE")
                .help("Model artifact (YAML or JSON)")
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("offline")
                .long("offline")
                .help("Skip all network lookups")
                .action(ArgAction::SetTrue)
                .conflicts_with("mock"),
        )
        .arg(
            Arg::new("mock")
                .long("mock")
                .help("Answer network lookups with deterministic healthy responses")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Print results as JSON")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging, including per-feature fallbacks")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let log_level = if matches.get_flag("verbose") {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    if let Some(generate_path) = matches.get_one::<String>("generate-config") {
        generate_default_config(generate_path);
        return;
    }

    let config_path = matches
        .get_one::<String>("config")
        .map(String::as_str)
        .unwrap_or("phishscan.yaml");

    let mut config = match Config::load_or_default(config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {e:#}");
            process::exit(1);
        }
    };

    if let Some(schema) = matches.get_one::<String>("schema") {
        match schema.parse::<SchemaKind>() {
            Ok(kind) => {
                if kind != config.schema && matches.get_one::<String>("model").is_none() {
                    config.model_path = kind.default_model_path().to_string();
                }
                config.schema = kind;
            }
            Err(e) => {
                eprintln!("Error: {e}");
                process::exit(1);
            }
        }
    }
    if let Some(model) = matches.get_one::<String>("model") {
        config.model_path = model.clone();
    }
    if matches.get_flag("offline") {
        config.network.mode = NetworkMode::Offline;
    } else if matches.get_flag("mock") {
        config.network.mode = NetworkMode::Mock;
    }

    let mut urls: Vec<String> = matches
        .get_many::<String>("urls")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();

    if let Some(batch) = matches.get_one::<String>("batch") {
        match read_batch_file(batch) {
            Ok(batch_urls) => urls.extend(batch_urls),
            Err(e) => {
                eprintln!("Error: {e:#}");
                process::exit(1);
            }
        }
    }
    if matches.get_flag("demo") {
        urls.extend(DEMO_URLS.iter().map(|u| u.to_string()));
    }

    if urls.is_empty() {
        eprintln!("No URLs to classify. Pass URLs, --batch FILE or --demo.");
        process::exit(1);
    }

    let lookups = match AnyLookups::from_config(&config.network) {
        Ok(lookups) => lookups,
        Err(e) => {
            eprintln!("Error creating network client: {e}");
            process::exit(1);
        }
    };

    let pipeline = match Pipeline::from_config(&config, lookups) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            eprintln!("Error: {e:#}");
            process::exit(1);
        }
    };

    log::info!(
        "Classifying {} URL(s) with the {} schema ({:?} network)",
        urls.len(),
        pipeline.schema().name,
        config.network.mode
    );

    let results = pipeline.classify_batch(&urls).await;

    if matches.get_flag("json") {
        match serde_json::to_string_pretty(&results) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Error serializing results: {e}");
                process::exit(1);
            }
        }
        return;
    }

    println!("\nTesting URLs for phishing detection:");
    println!("{}", "-".repeat(50));
    for result in &results {
        print_classification(result);
    }

    if let Some(path) = &config.output.features_csv {
        println!("\nExtracted features saved to: {path}");
    }
    if let Some(path) = &config.output.predictions_log {
        println!("Prediction results saved to: {path}");
    }
}

fn generate_default_config(path: &str) {
    let config = Config::default();
    match config.to_file(path) {
        Ok(()) => {
            println!("Default configuration written to: {path}");
            println!("Please edit the configuration file to suit your needs.");
        }
        Err(e) => {
            eprintln!("Error writing configuration file: {e:#}");
            process::exit(1);
        }
    }
}

fn print_classification(result: &Classification) {
    let verdict = &result.verdict;
    println!("\nURL: {}", result.url);
    println!("Prediction: {}", verdict.prediction_label());
    if let (Some(phishing), Some(legitimate)) =
        (verdict.probability, verdict.legitimate_confidence())
    {
        println!("Legitimate Confidence: {:.2}%", legitimate * 100.0);
        println!("Phishing Confidence: {:.2}%", phishing * 100.0);
    }
    println!("Warning Level: {}", verdict.warning());
    println!("{}", "-".repeat(50));
}
