use anyhow::Result;
use console::{Term, style};
use log::{info, warn};
use media_preview::component::media_decoder::FfmpegBackend;
use media_preview::config::Config;
use media_preview::init;
use media_preview::menu::{MenuContext, show_main_menu};
use media_preview::signal::setup_shutdown_signal;
use rust_i18n::t;
use std::sync::Arc;

#[macro_use]
extern crate rust_i18n;

i18n!("locales", fallback = "en-US");

fn main() -> Result<()> {
    init::init();
    let term = Term::stdout();
    let shutdown_signal = setup_shutdown_signal()?;

    let config = Config::new()?;
    rust_i18n::set_locale(config.settings.language.as_str());
    let mut context = MenuContext::new(config, Arc::new(FfmpegBackend), shutdown_signal)?;

    loop {
        match show_main_menu(&term, &mut context) {
            Ok(true) => {}
            Ok(false) => {
                term.clear_screen()?;
                println!("\n{}", style(t!("main_menu.goodbye")).green().bold());
                info!("{}", t!("log.normal_exit"));
                break;
            }
            Err(e) => {
                warn!("{}", t!("log.program_error", error = e.to_string()));
                eprintln!("{} {}", style(t!("common.error")).red().bold(), e);
                break;
            }
        }
    }

    Ok(())
}
