extern crate clap;
extern crate rustyline;
use clap::{App, Arg};
use env_logger::Env;
use log::{error, info};
use serde::Deserialize;

use rustyline::error::ReadlineError;
use rustyline::Editor;
use std::fs;

use annstore::storage_manager::StorageManager;
use common::storage_trait::EntityStore;
use sqlbridge::Conductor;

#[derive(Deserialize, Debug)]
struct ClientConfig {
    app: String,
    store_path: String,
}

/// Runs one chunk of SQL through the conductor and prints every output line.
///
/// Returns false when the quit command was entered.
fn process_input(conductor: &Conductor<StorageManager>, app: &str, input: &str) -> bool {
    if input.starts_with('\\') {
        if input.starts_with("\\quit") {
            info!("Received Quit Command");
            return false;
        }
        error!("No action specified for command {}", input);
        return true;
    }
    match conductor.translate(app, input) {
        Ok(lines) => {
            for line in lines {
                println!("{}", line);
            }
        }
        Err(e) => error!("{}", e),
    }
    true
}

#[allow(unused_must_use)]
fn process_cli_input(conductor: &Conductor<StorageManager>, app: &str) {
    let mut rl = Editor::<()>::new();
    if rl.load_history("history.txt").is_err() {
        info!("No previous history.");
    }
    let prompt: &str = "[annsql]>>";
    let mut cont = true;
    while cont {
        let readline = rl.readline(prompt);
        match readline {
            Ok(line) => {
                if line.as_str() == "" {
                    continue;
                }
                rl.add_history_entry(line.as_str());
                cont = process_input(conductor, app, line.as_str());
            }
            Err(ReadlineError::Interrupted) => {
                info!("CTRL-C");
                break;
            }
            Err(ReadlineError::Eof) => {
                info!("CTRL-D");
                break;
            }
            Err(err) => {
                error!("Error: {:?}", err);
                break;
            }
        }
    }
    rl.save_history("history.txt").unwrap();
}

fn process_script_input(conductor: &Conductor<StorageManager>, app: &str, script: String) {
    // The whole file goes through one translate call so consecutive writes
    // stay in one batch.
    if !process_input(conductor, app, script.trim()) {
        panic!("Bad Script");
    }
}

/// Entry point for the annsql client.
///
/// Opens the annotation store, then feeds it SQL from a REPL or a script.
fn main() {
    // Configure log environment
    env_logger::from_env(Env::default().default_filter_or("info")).init();

    let matches = App::new(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .author(env!("CARGO_PKG_AUTHORS"))
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .arg(
            Arg::with_name("config")
                .short("c")
                .long("config")
                .value_name("FILE")
                .help("Sets a custom config file")
                .takes_value(true)
                .required(false),
        )
        .arg(
            Arg::with_name("app")
                .short("a")
                .long("app")
                .value_name("app")
                .default_value("demo")
                .help("Application namespace all entities live under")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("store_path")
                .long("store_path")
                .value_name("store_path")
                .default_value("persist/annstore/")
                .help("Path where the annotation store is persisted")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("script")
                .short("s")
                .long("script")
                .value_name("ANNSQL_SCRIPT")
                .help("Takes in a semicolon delimited file of SQL statements.")
                .takes_value(true)
                .required(false),
        )
        .get_matches();

    let config = if let Some(c) = matches.value_of("config") {
        let config_path = c;
        let contents = fs::read_to_string(config_path).unwrap();
        serde_json::from_str(&contents).unwrap()
    } else {
        let app = matches.value_of("app").unwrap();
        let store_path = matches.value_of("store_path").unwrap();
        ClientConfig {
            app: app.to_string(),
            store_path: store_path.to_string(),
        }
    };

    info!("Starting annsql client with config: {:?}", config);

    let script: String = if let Some(s) = matches.value_of("script") {
        let script_path = s;
        fs::read_to_string(script_path).unwrap()
    } else {
        String::new()
    };

    let conductor = Conductor::new(StorageManager::new(config.store_path.clone()));
    if script.is_empty() {
        process_cli_input(&conductor, &config.app);
    } else {
        process_script_input(&conductor, &config.app, script);
    }
    conductor.store().shutdown();
    info!("Terminated.");
}
