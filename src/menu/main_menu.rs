use super::handlers::{
    run_preview_generator, run_sprite_generator, run_timestamp_lookup, show_cache_path,
};
use super::menu_context::MenuContext;
use crate::config::Language;
use crate::config::save::save_settings;
use anyhow::Result;
use console::{Term, style};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Select};
use rust_i18n::t;
use std::path::PathBuf;
use std::str::FromStr;

pub fn show_main_menu(term: &Term, context: &mut MenuContext) -> Result<bool> {
    term.clear_screen()?;

    println!("{}", style(t!("main_menu.title")).cyan().bold());
    println!("{}", style(t!("common.esc_hint")).dim());

    let options = vec![
        t!("main_menu.opt_preview"),
        t!("main_menu.opt_sprites"),
        t!("main_menu.opt_lookup"),
        t!("main_menu.opt_cache"),
        t!("main_menu.opt_settings"),
        t!("main_menu.exit"),
    ];

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(t!("main_menu.prompt"))
        .items(&options)
        .default(0)
        .interact_on_opt(term)?;

    match selection {
        Some(0) => {
            run_preview_generator(term, context)?;
            Ok(true)
        }
        Some(1) => {
            run_sprite_generator(term, context)?;
            Ok(true)
        }
        Some(2) => {
            run_timestamp_lookup(term, context)?;
            Ok(true)
        }
        Some(3) => {
            show_cache_path(term, context)?;
            Ok(true)
        }
        Some(4) => {
            show_settings_menu(term, context)?;
            Ok(true)
        }
        Some(5) | None => Ok(false),
        _ => unreachable!(),
    }
}

/// 設定選單
fn show_settings_menu(term: &Term, context: &mut MenuContext) -> Result<()> {
    loop {
        term.clear_screen()?;

        println!("{}", style(t!("settings.title")).cyan().bold());
        println!("{}", style(t!("common.esc_back")).dim());

        let settings = &context.config.settings;
        let cache_root = settings.cache_root.as_ref().map_or_else(
            || t!("settings.system_default").to_string(),
            |p| p.display().to_string(),
        );
        let workers = settings
            .sprite
            .workers
            .map_or_else(|| t!("settings.auto").to_string(), |n| n.to_string());

        let options = vec![
            t!("settings.opt_language", value = settings.language),
            t!("settings.opt_cache_root", value = cache_root),
            t!("settings.opt_preview_timeout", value = settings.preview.timeout_secs),
            t!("settings.opt_preview_quality", value = settings.preview.quality),
            t!("settings.opt_sprite_count", value = settings.sprite.default_count),
            t!("settings.opt_sprite_quality", value = settings.sprite.quality),
            t!("settings.opt_sprite_workers", value = workers),
            t!("settings.back"),
        ];

        let selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt(t!("settings.prompt"))
            .items(&options)
            .default(0)
            .interact_on_opt(term)?;

        let changed = match selection {
            Some(0) => {
                show_language_menu(term, context)?;
                false
            }
            Some(1) => edit_cache_root(context)?,
            Some(2) => edit_value(
                t!("settings.prompt_preview_timeout"),
                &mut context.config.settings.preview.timeout_secs,
            )?,
            Some(3) => edit_quality(
                t!("settings.prompt_preview_quality"),
                &mut context.config.settings.preview.quality,
            )?,
            Some(4) => edit_value(
                t!("settings.prompt_sprite_count"),
                &mut context.config.settings.sprite.default_count,
            )?,
            Some(5) => edit_quality(
                t!("settings.prompt_sprite_quality"),
                &mut context.config.settings.sprite.quality,
            )?,
            Some(6) => edit_workers(context)?,
            Some(7) | None => break,
            _ => unreachable!(),
        };

        if changed {
            save_settings(&context.config.settings)?;
            context.rebuild_engine()?;
            println!("\n{}", style(t!("settings.saved")).green());
            std::thread::sleep(std::time::Duration::from_secs(1));
        }
    }

    Ok(())
}

/// 語系選單：切換後立即生效並儲存，不需要重建引擎
fn show_language_menu(term: &Term, context: &mut MenuContext) -> Result<()> {
    term.clear_screen()?;

    println!("{}", style(t!("settings.language.title")).cyan().bold());
    println!("{}", style(t!("common.esc_back")).dim());

    let items: Vec<String> = Language::ALL.iter().map(ToString::to_string).collect();
    let default_index = Language::ALL
        .iter()
        .position(|&l| l == context.config.settings.language)
        .unwrap_or(0);

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(t!("settings.language.prompt"))
        .items(&items)
        .default(default_index)
        .interact_on_opt(term)?;

    let Some(selection) = selection else {
        return Ok(());
    };
    let selected = Language::ALL[selection];

    if selected != context.config.settings.language {
        context.config.settings.language = selected;
        rust_i18n::set_locale(selected.as_str());
        save_settings(&context.config.settings)?;
        println!("\n{} {selected}", style(t!("settings.saved")).green());
        std::thread::sleep(std::time::Duration::from_secs(1));
    }

    Ok(())
}

fn edit_value<T>(prompt: impl Into<String>, value: &mut T) -> Result<bool>
where
    T: Clone + PartialEq + FromStr + ToString,
    <T as FromStr>::Err: ToString,
{
    let input: T = Input::new()
        .with_prompt(prompt)
        .default(value.clone())
        .interact_text()?;

    if input == *value {
        return Ok(false);
    }
    *value = input;
    Ok(true)
}

fn edit_quality(prompt: impl Into<String>, value: &mut u8) -> Result<bool> {
    let input: u8 = Input::new()
        .with_prompt(prompt)
        .default(*value)
        .validate_with(|q: &u8| -> Result<(), String> {
            if (1..=100).contains(q) {
                Ok(())
            } else {
                Err(t!("settings.quality_range").to_string())
            }
        })
        .interact_text()?;

    if input == *value {
        return Ok(false);
    }
    *value = input;
    Ok(true)
}

fn edit_cache_root(context: &mut MenuContext) -> Result<bool> {
    let current = context
        .config
        .settings
        .cache_root
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_default();

    let input: String = Input::new()
        .with_prompt(t!("settings.prompt_cache_root"))
        .default(current)
        .allow_empty(true)
        .interact_text()?;

    let trimmed = input.trim();
    let cache_root = (!trimmed.is_empty()).then(|| PathBuf::from(trimmed));
    if cache_root == context.config.settings.cache_root {
        return Ok(false);
    }
    context.config.settings.cache_root = cache_root;
    Ok(true)
}

fn edit_workers(context: &mut MenuContext) -> Result<bool> {
    let current = context.config.settings.sprite.workers.unwrap_or(0);
    let input: usize = Input::new()
        .with_prompt(t!("settings.prompt_sprite_workers"))
        .default(current)
        .interact_text()?;

    let workers = (input > 0).then_some(input);
    if workers == context.config.settings.sprite.workers {
        return Ok(false);
    }
    context.config.settings.sprite.workers = workers;
    Ok(true)
}
