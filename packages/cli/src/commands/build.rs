use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use zephyr_common::{Diagnostic, Severity};
use zephyr_workspace::{BuildCoordinator, CompileOutput, FileWatcher};

#[derive(Debug, Args)]
pub struct BuildArgs {
    /// Entry stylesheet
    #[arg(short, long, default_value = "app.css")]
    pub input: String,

    /// Output file (stdout when omitted)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Watch for file changes and rebuild
    #[arg(short, long)]
    pub watch: bool,

    /// Working directory to resolve paths against
    #[arg(long)]
    pub cwd: Option<String>,
}

pub fn build(args: BuildArgs, cwd: &str) -> Result<()> {
    let cwd = args.cwd.as_deref().unwrap_or(cwd);
    let entry = resolve(cwd, &args.input);
    let output_path = args.output.as_ref().map(|o| resolve(cwd, o));

    if !entry.exists() {
        return Err(anyhow!("Entry stylesheet does not exist: {}", entry.display()));
    }

    let mut coordinator = BuildCoordinator::new(&entry);

    println!(
        "{} {}",
        "🌀 Compiling".bright_blue().bold(),
        entry.display()
    );

    let output = coordinator.build()?;
    emit(output, output_path.as_deref())?;

    if !args.watch {
        return Ok(());
    }

    let base = entry
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let watcher = FileWatcher::new(&base)?;

    println!("\n{}", "👀 Watching for changes...".bright_blue());

    loop {
        let Some(event) = watcher.next_event() else {
            continue;
        };
        for path in event.paths {
            coordinator.notify_change(path);
        }

        // Editors write in bursts; fold the rest of the burst into one batch
        while let Some(event) = watcher.next_event_timeout(Duration::from_millis(50)) {
            for path in event.paths {
                coordinator.notify_change(path);
            }
        }

        if !coordinator.has_pending() {
            continue;
        }

        let output = coordinator.process_pending()?;
        emit(output, output_path.as_deref())?;
        println!("  {} rebuilt", "✓".green());
    }
}

fn emit(output: &CompileOutput, path: Option<&Path>) -> Result<()> {
    for diagnostic in &output.diagnostics {
        print_diagnostic(diagnostic);
    }

    match path {
        Some(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, &output.css)?;
            println!(
                "  {} {} ({} bytes)",
                "✓".green(),
                path.display(),
                output.css.len()
            );
        }
        None => print!("{}", output.css),
    }

    Ok(())
}

fn print_diagnostic(diagnostic: &Diagnostic) {
    let label = match diagnostic.severity {
        Severity::Error => "error".red().bold(),
        Severity::Warning => "warning".yellow().bold(),
        Severity::Info => "info".dimmed(),
    };

    let mut line = format!("  {} {}", label, diagnostic.message);
    if let Some(candidate) = &diagnostic.candidate {
        line.push_str(&format!(" ({})", candidate.dimmed()));
    }
    if let Some(file) = &diagnostic.file {
        line.push_str(&format!(" [{}]", file.display()));
    }
    eprintln!("{}", line);
}

fn resolve(cwd: &str, path: &str) -> PathBuf {
    let path = Path::new(path);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        Path::new(cwd).join(path)
    }
}
