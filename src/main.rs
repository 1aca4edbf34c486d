//! Vireo - a tabbed browser shell
//!
//! Entry point for the Vireo browser application.

use std::env;
use vireo::shell::guess_uri;
use vireo::toolkit::Runtime;
use vireo::ui::{Theme, UiConfig};
use vireo::{Browser, LastTabPolicy, NAME, ShellConfig, VERSION};

struct Args {
    headless: bool,
    shell: ShellConfig,
    ui: UiConfig,
    uris: Vec<String>,
}

fn parse_args() -> Result<Args, String> {
    let mut args = Args {
        headless: false,
        shell: ShellConfig::default(),
        ui: UiConfig::default(),
        uris: Vec::new(),
    };

    for arg in env::args().skip(1) {
        match arg.as_str() {
            "--headless" => args.headless = true,
            "--keep-last-tab" => args.shell.last_tab_policy = LastTabPolicy::KeepOne,
            other => {
                if let Some(name) = other.strip_prefix("--theme=") {
                    args.ui.theme =
                        Theme::from_name(name).ok_or_else(|| format!("unknown theme: {name}"))?;
                } else if other.starts_with("--") {
                    return Err(format!("unknown option: {other}"));
                } else {
                    args.uris.push(guess_uri(other));
                }
            }
        }
    }
    Ok(args)
}

fn main() {
    env_logger::init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{e}");
            eprintln!("usage: vireo [--headless] [--keep-last-tab] [--theme=NAME] [URI...]");
            std::process::exit(2);
        }
    };

    if args.headless {
        run_headless_mode(args);
    } else {
        run_gui_mode(args);
    }
}

fn run_headless_mode(args: Args) {
    println!("{} v{} - headless session", NAME, VERSION);

    let rt = Runtime::new();
    let mut browser = Browser::new(&rt, args.shell, &args.uris);
    for (index, tab) in browser.tabs().iter().enumerate() {
        let marker = if browser.active_index() == Some(index) { "*" } else { " " };
        println!(
            "{marker} {index}: {}",
            tab.view().uri().unwrap_or_else(|| "(blank)".to_string())
        );
    }
    println!("live objects: {}", rt.live_objects());

    browser.close();
    let stats = rt.stats();
    println!(
        "closed: {} created, {} finalized, {} live",
        stats.created,
        stats.finalized,
        rt.live_objects()
    );
}

fn run_gui_mode(args: Args) {
    println!("{} v{} - Starting GUI...", NAME, VERSION);

    if let Err(e) = vireo::ui::run(args.ui, args.shell, args.uris) {
        eprintln!("Failed to start browser: {}", e);
        std::process::exit(1);
    }
}
