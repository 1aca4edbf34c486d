//! Main browser application using eframe/egui
//!
//! The frontend never changes shell state directly. Every user action is
//! delivered as a toolkit emission (a click, a key press, an activation)
//! and the browser is pumped afterwards, exactly as with a native toolkit.

use super::{Theme, UiConfig};
use crate::shell::{Browser, ShellConfig};
use crate::toolkit::{Key, KeyEvent, Object, Runtime, Widget};
use crate::utils::error::Result;
use log::{debug, info};

/// Main browser application
pub struct BrowserApp {
    /// UI configuration
    config: UiConfig,
    browser: Browser,
    /// URL bar content while the user edits it
    url_input: String,
    editing_url: bool,
    /// Last title sent to the native window
    shown_title: String,
}

impl BrowserApp {
    /// Create the application around a freshly opened browser
    pub fn new<S: AsRef<str>>(
        _cc: &eframe::CreationContext<'_>,
        config: UiConfig,
        shell: ShellConfig,
        uris: &[S],
    ) -> Self {
        let browser = Browser::new(&Runtime::new(), shell, uris);
        Self {
            config,
            browser,
            url_input: String::new(),
            editing_url: false,
            shown_title: String::new(),
        }
    }

    /// Render the toolbar
    fn render_toolbar(&mut self, ui: &mut egui::Ui) {
        let Some(chrome) = self.browser.chrome() else {
            return;
        };
        let (back, forward, entry, new_tab) = (
            chrome.back_button().clone(),
            chrome.forward_button().clone(),
            chrome.entry().clone(),
            chrome.new_tab_button().clone(),
        );

        ui.horizontal(|ui| {
            if ui.add_enabled(back.is_sensitive(), egui::Button::new("←")).clicked() {
                back.clicked();
            }
            if ui
                .add_enabled(forward.is_sensitive(), egui::Button::new("→"))
                .clicked()
            {
                forward.clicked();
            }
            if ui.button("⟳").clicked() {
                entry.refresh();
            }

            if !self.editing_url {
                self.url_input = entry.text().unwrap_or_default();
            }
            let response = ui.add(
                egui::TextEdit::singleline(&mut self.url_input)
                    .desired_width(ui.available_width() - 40.0)
                    .hint_text("Enter address"),
            );
            if entry.has_focus() && !response.has_focus() && !self.editing_url {
                response.request_focus();
            }
            if response.gained_focus() {
                entry.grab_focus();
                self.editing_url = true;
            }
            if response.changed() {
                entry.set_text(&self.url_input);
            }
            if response.lost_focus() {
                self.editing_url = false;
                if ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                    entry.set_text(&self.url_input);
                    entry.activate();
                } else if let Some(page) = self.browser.page().active() {
                    page.view().grab_focus();
                }
            }

            if ui.button("+").clicked() {
                new_tab.clicked();
            }
        });
    }

    /// Render the tab strip
    fn render_tab_bar(&mut self, ui: &mut egui::Ui) {
        let Some(chrome) = self.browser.chrome() else {
            return;
        };
        let notebook = chrome.notebook().clone();
        if !notebook.show_tabs() {
            return;
        }
        let placeholder = self.browser.tabs().placeholder().to_string();
        let tabs: Vec<_> = self
            .browser
            .tabs()
            .iter()
            .map(|t| {
                (
                    t.view().clone(),
                    t.title_label().text().unwrap_or_else(|| placeholder.clone()),
                    t.close_button().clone(),
                )
            })
            .collect();
        let active = self.browser.active_index();
        let last = tabs.len().saturating_sub(1);

        ui.horizontal(|ui| {
            for (index, (view, title, close)) in tabs.into_iter().enumerate() {
                let is_active = active == Some(index);
                let text = if title.chars().count() > 20 {
                    format!("{}...", title.chars().take(17).collect::<String>())
                } else {
                    title
                };

                if ui.selectable_label(is_active, text).clicked() {
                    notebook.set_current_page(index);
                }
                if is_active {
                    if index > 0 && ui.small_button("◀").clicked() {
                        notebook.reorder_child(view.id(), index - 1);
                    }
                    if index < last && ui.small_button("▶").clicked() {
                        notebook.reorder_child(view.id(), index + 1);
                    }
                }
                if ui.small_button("×").clicked() {
                    close.clicked();
                }
                ui.separator();
            }
        });
    }

    /// Render the content area
    fn render_content(&mut self, ui: &mut egui::Ui) {
        let Some(page) = self.browser.page().active() else {
            return;
        };
        let view = page.view().clone();
        match view.uri() {
            None => self.render_new_tab_page(ui),
            Some(uri) => {
                ui.vertical_centered(|ui| {
                    ui.add_space(40.0);
                    ui.heading(
                        view.title()
                            .filter(|t| !t.is_empty())
                            .unwrap_or_else(|| uri.clone()),
                    );
                    ui.label(format!("Page: {}", uri));
                    if let Some(list) = view.back_forward_list() {
                        ui.weak(format!("{} entries in history", list.len()));
                    }
                });
            }
        }
    }

    /// Render new tab page
    fn render_new_tab_page(&mut self, ui: &mut egui::Ui) {
        let mut target = None;
        ui.vertical_centered(|ui| {
            ui.add_space(100.0);
            ui.heading(crate::NAME);
            ui.add_space(40.0);

            ui.horizontal(|ui| {
                if ui.button("News").clicked() {
                    target = Some("https://news.ycombinator.com");
                }
                if ui.button("Search").clicked() {
                    target = Some("https://duckduckgo.com");
                }
            });
        });
        if let Some(uri) = target {
            if let Err(err) = self.browser.navigate(uri) {
                debug!("navigation ignored: {err}");
            }
        }
    }

    /// Forward shortcut-looking key presses to the toolkit window
    fn forward_keys(&mut self, ctx: &egui::Context) {
        let Some(window) = self.browser.chrome().map(|c| c.window().clone()) else {
            return;
        };
        let presses: Vec<KeyEvent> = ctx.input(|i| {
            i.events
                .iter()
                .filter_map(|event| match event {
                    egui::Event::Key {
                        key,
                        pressed: true,
                        modifiers,
                        ..
                    } => key_event(*key, *modifiers),
                    _ => None,
                })
                .collect()
        });
        for press in presses {
            window.key_press(press);
        }
    }

    fn sync_title(&mut self, ctx: &egui::Context) {
        let Some(title) = self.browser.chrome().and_then(|c| c.window().title()) else {
            return;
        };
        if title != self.shown_title {
            ctx.send_viewport_cmd(egui::ViewportCommand::Title(title.clone()));
            self.shown_title = title;
        }
    }
}

fn key_event(key: egui::Key, modifiers: egui::Modifiers) -> Option<KeyEvent> {
    if !modifiers.command {
        return None;
    }
    let key = match key {
        egui::Key::Tab => Key::Tab,
        egui::Key::L => Key::Char('l'),
        egui::Key::T => Key::Char('t'),
        egui::Key::W => Key::Char('w'),
        egui::Key::Q => Key::Char('q'),
        egui::Key::Num1 => Key::Digit(1),
        egui::Key::Num2 => Key::Digit(2),
        egui::Key::Num3 => Key::Digit(3),
        egui::Key::Num4 => Key::Digit(4),
        egui::Key::Num5 => Key::Digit(5),
        egui::Key::Num6 => Key::Digit(6),
        egui::Key::Num7 => Key::Digit(7),
        egui::Key::Num8 => Key::Digit(8),
        egui::Key::Num9 => Key::Digit(9),
        _ => return None,
    };
    Some(KeyEvent {
        key,
        ctrl: true,
        shift: modifiers.shift,
    })
}

impl eframe::App for BrowserApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Apply theme
        match self.config.theme {
            Theme::Light => ctx.set_visuals(egui::Visuals::light()),
            Theme::Dark => ctx.set_visuals(egui::Visuals::dark()),
            Theme::System => {} // Use system default
        }
        ctx.set_zoom_factor(self.config.default_zoom);

        if ctx.input(|i| i.viewport().close_requested()) {
            if let Some(chrome) = self.browser.chrome() {
                chrome.window().destroy();
            }
        }
        self.forward_keys(ctx);
        self.browser.pump();

        if self.browser.is_closed() {
            info!("browser closed, exiting");
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            return;
        }

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            self.render_toolbar(ui);
        });
        egui::TopBottomPanel::top("tabs").show(ctx, |ui| {
            self.render_tab_bar(ui);
        });
        egui::CentralPanel::default().show(ctx, |ui| {
            self.render_content(ui);
        });

        // Clicks above only queued events.
        self.browser.pump();
        self.sync_title(ctx);
    }
}

/// Run the browser application
pub fn run(config: UiConfig, shell: ShellConfig, uris: Vec<String>) -> Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([shell.window_width as f32, shell.window_height as f32])
            .with_min_inner_size([400.0, 300.0])
            .with_title(&shell.default_title),
        ..Default::default()
    };

    let name = shell.default_title.clone();
    eframe::run_native(
        &name,
        options,
        Box::new(move |cc| Ok(Box::new(BrowserApp::new(cc, config, shell, &uris)))),
    )?;
    Ok(())
}
