// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Kanflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Kanflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Kanflow CLI entrypoint.
//!
//! By default this loads one workflow and runs the interactive editor. Use `--print` to render
//! the diagram to stdout instead.

use std::error::Error;
use std::fs::File;
use std::sync::Mutex;

use kanflow::config::{self, AppConfig, ConfigError, StoreSource};
use kanflow::session::{WorkflowBackend, WorkflowSession};
use kanflow::store::{MemoryBackend, WorkflowFolder};
use tokio::runtime::Runtime;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_tracing(config: &AppConfig) -> Result<(), Box<dyn Error>> {
    let filter = EnvFilter::try_new(&config.log_filter)?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    // The editor owns the terminal, so logs go to a file next to where it was started.
    if config.print {
        builder.with_writer(std::io::stderr).init();
    } else {
        let file = File::create(config::LOG_FILE_NAME)?;
        builder.with_ansi(false).with_writer(Mutex::new(file)).init();
    }
    Ok(())
}

fn run_with<B>(backend: B, config: AppConfig, runtime: &Runtime) -> Result<(), Box<dyn Error>>
where
    B: WorkflowBackend + Clone + Send + Sync + 'static,
{
    let mut session = WorkflowSession::new(backend, config.render);
    runtime.block_on(session.load(config.scope.clone()))?;

    if !config.print {
        return kanflow::tui::run(session, runtime);
    }

    if let Some(editor) = session.editor() {
        println!("{}", editor.text());
    }
    if let Some(summary) = session.summary() {
        println!("{summary}");
    }
    for warning in session.warnings() {
        println!("warning: {warning}");
    }
    Ok(())
}

fn main() {
    let result = (|| -> Result<(), Box<dyn Error>> {
        let mut args = std::env::args();
        let program = args.next().unwrap_or_else(|| "kanflow".to_owned());

        let config = match config::parse_args(args)
            .and_then(|options| AppConfig::resolve(options, |name| std::env::var(name).ok()))
        {
            Ok(config) => config,
            Err(ConfigError::HelpRequested) => {
                println!("{}", config::usage(&program));
                std::process::exit(0);
            }
            Err(err) => {
                eprintln!("{program}: {err}\n");
                eprintln!("{}", config::usage(&program));
                std::process::exit(2);
            }
        };

        init_tracing(&config)?;
        info!(scope = %config.scope.fetch_key(), store = ?config.store, "starting kanflow");

        // One worker runs saves while the editor thread waits for input.
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()?;
        match config.store.clone() {
            StoreSource::Demo => run_with(MemoryBackend::demo(), config, &runtime),
            StoreSource::Folder(dir) => {
                let folder = WorkflowFolder::new(dir).with_durability(config.durability);
                if !folder.is_initialized()? {
                    return Err(format!(
                        "{} is not a kanflow store (no {})",
                        folder.root().display(),
                        folder.scopes_path().display()
                    )
                    .into());
                }
                run_with(folder, config, &runtime)
            }
        }
    })();

    if let Err(err) = result {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
