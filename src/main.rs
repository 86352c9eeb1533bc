use pdfstack::app::App;
use pdfstack::cli::{AppConfig, Args};
use pdfstack::config::UserConfig;
use pdfstack::domain::{apply_manual_sort, FileSelection, SelectionStore};
use pdfstack::logging::{default_log_path, init_tracing, LogTarget};
use pdfstack::open_file;
use pdfstack::thumbnails::SyncThumbnailManager;
use pdfstack::tui::{handle_key, handle_mouse, render, show_notices, Command, Modal, Ui};
use pdfstack::{
    AssembledDocument, AssemblyPipeline, AssemblyStatus, BackgroundAssembly, FsImageDecoder,
    OutputTarget, PdfDocumentBuilder,
};

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::path::{Path, PathBuf};
use std::{io, time::Duration};
use tokio::runtime::Runtime;

fn main() -> io::Result<()> {
    // Parse command line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Convert to config
    let config: AppConfig = args.into();

    // The grid owns the terminal, so interactive runs log to a file
    let log_target = if config.batch {
        LogTarget::Stderr
    } else {
        LogTarget::File(
            config
                .log_file
                .clone()
                .or_else(default_log_path)
                .unwrap_or_else(|| PathBuf::from("pdfstack.log")),
        )
    };
    init_tracing(&log_target, config.verbose);

    let runtime = Runtime::new()?;

    // Load user configuration
    let mut user_config = UserConfig::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "failed to load user config");
        eprintln!("Warning: Failed to load user config: {}", e);
        UserConfig::default()
    });
    let output_dir = user_config.resolve_output_dir(config.output_dir.as_deref());

    if config.batch {
        if let Err(e) = run_batch(&config, &runtime, &output_dir) {
            tracing::error!(error = %e, "batch assembly failed");
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
        return Ok(());
    }

    run_app_with_config(&config, &runtime, &output_dir, &mut user_config)
}

/// Assembles the selection without the TUI, printing progress to stderr
fn run_batch(config: &AppConfig, runtime: &Runtime, output_dir: &Path) -> pdfstack::Result<()> {
    let selection = FileSelection::scan(&config.paths, &config.discovery_options())?;
    eprintln!("{}", selection.summary());

    let mut store = SelectionStore::new(selection.files().to_vec());
    if let Some(ranks) = &config.ranks {
        apply_manual_sort(&mut store, ranks.as_slice())?;
    }

    let target = OutputTarget::new(output_dir, &config.output_name);
    let pipeline = AssemblyPipeline::new(FsImageDecoder);
    let mut progress = pipeline.subscribe();

    let document: AssembledDocument = runtime.block_on(async move {
        let reporter = tokio::spawn(async move {
            while progress.changed().await.is_ok() {
                let p = *progress.borrow_and_update();
                if p.total > 0 {
                    eprintln!("  page {}/{}", p.completed, p.total);
                }
            }
        });

        let result = pipeline
            .assemble_store(&store, PdfDocumentBuilder::new, &target)
            .await;

        // Closing the sender ends the reporter
        drop(pipeline);
        let _ = reporter.await;
        result
    })?;

    println!(
        "Saved {} ({} pages)",
        document.path.display(),
        document.pages.len()
    );

    if config.open_after {
        if let Err(e) = open_file(&document.path) {
            eprintln!("Warning: Failed to open PDF: {}", e);
        }
    }

    Ok(())
}

/// Runs the TUI application with configuration
pub fn run_app_with_config(
    config: &AppConfig,
    runtime: &Runtime,
    output_dir: &Path,
    user_config: &mut UserConfig,
) -> io::Result<()> {
    let discovery = config.discovery_options();
    let selection = FileSelection::scan(&config.paths, &discovery)?;
    tracing::info!(count = selection.len(), "selection loaded");

    let mut app = App::new(selection, &config.output_name, output_dir)
        .with_source(config.paths.clone(), discovery);
    let mut ui = Ui::new();
    let mut thumbnails = SyncThumbnailManager::new(runtime.handle().clone());

    // Show welcome on first launch or if --welcome flag is set
    if config.show_welcome || !user_config.welcome_shown {
        ui.chrome.open_modal(Modal::Welcome);
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main loop
    let result = run_loop(
        &mut terminal,
        &mut app,
        &mut ui,
        &mut thumbnails,
        runtime,
        config,
        user_config,
    );

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Some(path) = &app.last_output {
        println!("Last PDF: {}", path.display());
    }

    result
}

fn open_pdf(app: &mut App, path: &Path) {
    match open_file(path) {
        Ok(()) => app.set_info(format!("Opened {}", path.display())),
        Err(e) => app.report(&e),
    }
}

/// Main application loop
fn run_loop<B: ratatui::backend::Backend + std::io::Write>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    ui: &mut Ui,
    thumbnails: &mut SyncThumbnailManager,
    runtime: &Runtime,
    config: &AppConfig,
    user_config: &mut UserConfig,
) -> io::Result<()> {
    let mut assembly: Option<BackgroundAssembly> = None;

    loop {
        // Collect background work before drawing
        let status = assembly.as_mut().and_then(BackgroundAssembly::poll);
        match status {
            Some(AssemblyStatus::Running(progress)) => app.progress = progress,
            Some(AssemblyStatus::Finished(result)) => {
                if let Some(job) = assembly.take() {
                    app.progress = job.progress();
                }
                let saved = result.as_ref().ok().map(|document| document.path.clone());
                app.finish_assembly(result);
                if config.open_after {
                    if let Some(path) = saved {
                        open_pdf(app, &path);
                    }
                }
            }
            None => assembly = None,
        }
        show_notices(app, ui);
        thumbnails.poll();

        terminal.draw(|frame| render(frame, app, ui, thumbnails))?;

        // Handle input
        if !event::poll(Duration::from_millis(100))? {
            continue;
        }

        let command = match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => handle_key(app, ui, key),
            Event::Mouse(mouse) => handle_mouse(app, ui, mouse),
            _ => Command::None,
        };

        match command {
            Command::Quit => {
                if assembly.is_some() {
                    tracing::warn!("quit while a PDF was being created; output discarded");
                }
                break;
            }
            Command::CreatePdf => match app.prepare_assembly() {
                Ok((ticket, target)) => {
                    tracing::info!(pages = ticket.order().len(), "starting assembly");
                    app.set_info(format!("Creating {}", target.file_path().display()));
                    assembly = Some(BackgroundAssembly::spawn(
                        runtime.handle().clone(),
                        AssemblyPipeline::new(FsImageDecoder),
                        ticket,
                        PdfDocumentBuilder::new,
                        target,
                    ));
                }
                Err(e) => app.report(&e),
            },
            Command::OpenPdf => match app.last_output.clone() {
                Some(path) => open_pdf(app, &path),
                None => app.set_info("No PDF created yet"),
            },
            Command::Rescan => match app.rescan() {
                Ok(()) => thumbnails.reset(),
                Err(e) => app.report(&e),
            },
            Command::WelcomeDismissed => {
                // Mark welcome as shown and persist
                user_config.welcome_shown = true;
                if let Err(e) = user_config.save() {
                    tracing::warn!(error = %e, "failed to save user config");
                }
            }
            Command::None => {}
        }
    }

    Ok(())
}
