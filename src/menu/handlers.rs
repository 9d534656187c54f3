use super::menu_context::MenuContext;
use crate::component::MediaEvent;
use crate::pause;
use crate::tools::validate_file_exists;
use anyhow::{Result, anyhow};
use console::{Term, style};
use dialoguer::Input;
use indicatif::{ProgressBar, ProgressStyle};
use rust_i18n::t;
use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;
use std::sync::mpsc::RecvTimeoutError;
use std::thread;
use std::time::{Duration, Instant};

/// 等待預覽結果時，在逾時時限之外多等的時間
const PREVIEW_WAIT_MARGIN: Duration = Duration::from_secs(2);
const EVENT_POLL_INTERVAL: Duration = Duration::from_millis(100);

pub fn run_preview_generator(term: &Term, context: &MenuContext) -> Result<()> {
    println!("{}", style(t!("preview.title")).cyan().bold());

    if let Err(e) = generate_preview(context) {
        eprintln!("{} {}", style(t!("common.error")).red().bold(), e);
    }

    pause(term)?;
    Ok(())
}

fn generate_preview(context: &MenuContext) -> Result<()> {
    let media_path = prompt_media_path(t!("preview.prompt_path"))?;
    validate_file_exists(&media_path)?;

    context.drain_events();
    let state = context.engine().generate_preview(&media_path);

    let deadline = Instant::now()
        + Duration::from_secs(context.config.settings.preview.timeout_secs)
        + PREVIEW_WAIT_MARGIN;
    let spinner = ProgressBar::new_spinner();
    spinner.set_message(t!("preview.generating"));
    spinner.enable_steady_tick(EVENT_POLL_INTERVAL);

    loop {
        match context.events().recv_timeout(EVENT_POLL_INTERVAL) {
            Ok(event) => show_preview_event(&spinner, event),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
        if !state.preview_loading() || Instant::now() >= deadline {
            break;
        }
    }
    // 結果寫回後才發出的錯誤事件
    while let Ok(event) = context.events().recv_timeout(EVENT_POLL_INTERVAL) {
        show_preview_event(&spinner, event);
    }
    spinner.finish_and_clear();

    let preview_path = state.preview_path();
    if preview_path.is_empty() {
        println!("{}", style(t!("preview.failed")).yellow());
    } else {
        println!("{} {preview_path}", style(t!("preview.result")).green());
    }
    Ok(())
}

fn show_preview_event(spinner: &ProgressBar, event: MediaEvent) {
    if let MediaEvent::GenerationError(message) = event {
        spinner.println(format!("{} {message}", style(t!("common.failed")).red()));
    }
}

pub fn run_sprite_generator(term: &Term, context: &MenuContext) -> Result<()> {
    println!("{}", style(t!("sprites.title")).cyan().bold());

    if let Err(e) = generate_sprites(context) {
        eprintln!("{} {}", style(t!("common.error")).red().bold(), e);
    }

    pause(term)?;
    Ok(())
}

fn generate_sprites(context: &MenuContext) -> Result<()> {
    let media_path = prompt_media_path(t!("sprites.prompt_path"))?;
    validate_file_exists(&media_path)?;

    let count: usize = Input::new()
        .with_prompt(t!("sprites.prompt_count"))
        .default(context.config.settings.sprite.default_count)
        .interact_text()?;

    context.drain_events();

    let progress_bar = ProgressBar::new(count as u64);
    progress_bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );
    progress_bar.set_message(t!("sprites.extracting"));

    let engine = context.engine();
    let paths = thread::scope(|scope| {
        let worker = scope.spawn(|| engine.generate_sprites(&media_path, count));

        loop {
            match context.events().recv_timeout(EVENT_POLL_INTERVAL) {
                Ok(event) => show_sprite_event(&progress_bar, event),
                Err(RecvTimeoutError::Timeout) if worker.is_finished() => break,
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        worker
            .join()
            .map_err(|_| anyhow!("{}", t!("sprites.thread_panicked")))
    })?;

    for event in context.events().try_iter() {
        show_sprite_event(&progress_bar, event);
    }

    if context.shutdown_signal().load(Ordering::SeqCst) {
        progress_bar.abandon_with_message(t!("sprites.interrupted"));
    } else {
        progress_bar.finish_with_message(t!("sprites.done"));
    }

    if paths.is_empty() {
        println!("{}", style(t!("sprites.none")).yellow());
        return Ok(());
    }

    println!(
        "\n{}",
        style(t!("sprites.generated", count = paths.len())).green()
    );
    for path in &paths {
        println!(
            "  {:>9.3}s  {}",
            engine.get_sprite_timestamp(path),
            path.display()
        );
    }
    Ok(())
}

fn show_sprite_event(progress_bar: &ProgressBar, event: MediaEvent) {
    match event {
        MediaEvent::SpriteProgress { completed, total } => {
            progress_bar.set_length(total as u64);
            progress_bar.set_position(completed as u64);
        }
        MediaEvent::GenerationError(message) => {
            progress_bar.println(format!("{} {message}", style(t!("common.failed")).red()));
        }
        _ => {}
    }
}

pub fn run_timestamp_lookup(term: &Term, context: &MenuContext) -> Result<()> {
    println!("{}", style(t!("lookup.title")).cyan().bold());

    let sprite_path = prompt_media_path(t!("lookup.prompt_path"))?;
    match context.engine().sprite_timestamp(&sprite_path) {
        Some(seconds) => println!("{} {seconds:.3}s", style(t!("lookup.found")).green()),
        None => println!("{}", style(t!("lookup.not_found")).yellow()),
    }

    pause(term)?;
    Ok(())
}

pub fn show_cache_path(term: &Term, context: &MenuContext) -> Result<()> {
    let locator = context.engine().cache_locator();
    println!("{}", style(t!("cache.title")).cyan().bold());
    println!("{} {}", style(t!("cache.root")).dim(), locator.root().display());
    println!(
        "{} {}",
        style(t!("cache.previews")).dim(),
        context.engine().get_cache_path()
    );

    pause(term)?;
    Ok(())
}

fn prompt_media_path(prompt: impl Into<String>) -> Result<PathBuf> {
    let path: String = Input::new().with_prompt(prompt).interact_text()?;
    Ok(Path::new(path.trim().trim_matches(['"', '\''])).to_path_buf())
}
