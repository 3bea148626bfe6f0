use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

use eframe::egui::{
    self, text::LayoutJob, Align, Color32, FontId, Frame, Key, Layout, Margin, RichText, Rounding,
    ScrollArea, Stroke, TextFormat, TextStyle, Vec2, ViewportCommand,
};
use quietline_core::{
    Gesture, PopupConfig, PopupOutcome, PopupRequest, PopupSession, Role, WorkerRequest,
};
use tracing::{debug, info};

use crate::errors::WorkerError;
use crate::markdown::{parse_blocks, Block, Span};
use crate::palette::Palette;

const MIN_WINDOW_SIDE: f32 = 400.0;
const USER_BUBBLE_WIDTH: f32 = 350.0;
const ASSISTANT_BUBBLE_WIDTH: f32 = 380.0;
const SEND_BUTTON_SIDE: f32 = 50.0;
const MIN_INPUT_ROWS: usize = 2;
const MAX_INPUT_ROWS: usize = 8;

/// Open the popup window and block until it closes.
pub fn run(request: WorkerRequest) -> Result<PopupOutcome, WorkerError> {
    let WorkerRequest { request, colors } = request;
    let palette = Palette::from_colors(&colors);
    let options = native_options(&request.config);
    let app_name = request.config.title.clone();

    let slot: Rc<Cell<Option<PopupOutcome>>> = Rc::new(Cell::new(None));
    let app_slot = Rc::clone(&slot);
    eframe::run_native(
        &app_name,
        options,
        Box::new(move |cc| Ok(Box::new(PopupApp::new(cc, request, palette, app_slot)))),
    )
    .map_err(|err| WorkerError::Gui(err.to_string()))?;

    // The event loop can end without a gesture, e.g. on a platform quit.
    Ok(slot.take().unwrap_or(PopupOutcome::Dismissed))
}

fn native_options(config: &PopupConfig) -> eframe::NativeOptions {
    let mut viewport = egui::ViewportBuilder::default()
        .with_title(config.title.clone())
        .with_inner_size([config.width as f32, config.height as f32])
        .with_min_inner_size([MIN_WINDOW_SIDE, MIN_WINDOW_SIDE])
        .with_active(true);
    if config.topmost {
        viewport = viewport.with_always_on_top();
    }
    eframe::NativeOptions {
        viewport,
        centered: true,
        ..Default::default()
    }
}

/// One chat bubble with its text already segmented.
#[derive(Clone, Debug, PartialEq, Eq)]
struct Bubble {
    role: Role,
    blocks: Vec<Block>,
}

impl Bubble {
    fn new(role: Role, text: &str) -> Self {
        Self {
            role,
            blocks: parse_blocks(text),
        }
    }
}

/// History bubbles in order, then the current message from the assistant.
fn bubbles_for(request: &PopupRequest) -> Vec<Bubble> {
    request
        .visible_history()
        .iter()
        .map(|entry| Bubble::new(entry.role, &entry.content))
        .chain(std::iter::once(Bubble::new(Role::Assistant, &request.message)))
        .collect()
}

/// Input box height follows its content within fixed bounds.
fn input_rows(text: &str) -> usize {
    text.split('\n').count().clamp(MIN_INPUT_ROWS, MAX_INPUT_ROWS)
}

struct PopupApp {
    config: PopupConfig,
    palette: Palette,
    bubbles: Vec<Bubble>,
    session: PopupSession,
    input: String,
    deadline: Option<Instant>,
    slot: Rc<Cell<Option<PopupOutcome>>>,
    first_frame: bool,
    send_hovered: bool,
}

impl PopupApp {
    fn new(
        cc: &eframe::CreationContext<'_>,
        request: PopupRequest,
        palette: Palette,
        slot: Rc<Cell<Option<PopupOutcome>>>,
    ) -> Self {
        cc.egui_ctx.set_visuals(if palette.dark {
            egui::Visuals::dark()
        } else {
            egui::Visuals::light()
        });
        let font_size = f32::from(request.config.font_size);
        cc.egui_ctx.style_mut(|style| {
            for (text_style, font) in style.text_styles.iter_mut() {
                font.size = match text_style {
                    TextStyle::Heading => font_size + 4.0,
                    TextStyle::Small => (font_size - 3.0).max(8.0),
                    _ => font_size,
                };
            }
        });
        // egui ships its own faces; the family is honored only as far as
        // the default fonts allow.
        debug!(font_family = %request.config.font_family, "popup font requested");

        let deadline = request
            .config
            .timeout_duration()
            .and_then(|timeout| Instant::now().checked_add(timeout));
        info!(
            wait_for_response = request.wait_for_response,
            history = request.visible_history().len(),
            has_timeout = deadline.is_some(),
            "popup opened"
        );

        Self {
            bubbles: bubbles_for(&request),
            session: PopupSession::new(request.wait_for_response),
            config: request.config,
            palette,
            input: String::new(),
            deadline,
            slot,
            first_frame: true,
            send_hovered: false,
        }
    }

    fn apply(&mut self, ctx: &egui::Context, gesture: Gesture) {
        if let Some(outcome) = self.session.handle(gesture) {
            debug!(kind = outcome.kind(), "popup gesture closed the session");
            self.slot.set(Some(outcome));
            ctx.send_viewport_cmd(ViewportCommand::Close);
        }
    }

    /// Gestures that do not come from a widget: window close, Escape, bare
    /// Enter, and the timer.
    fn poll_gestures(&mut self, ctx: &egui::Context) {
        if ctx.input(|i| i.viewport().close_requested()) {
            self.apply(ctx, Gesture::Close);
            return;
        }
        if ctx.input(|i| i.key_pressed(Key::Escape)) {
            self.apply(ctx, Gesture::Cancel);
            return;
        }
        if self.session.wait_for_response() && take_bare_enter(ctx) {
            self.apply(ctx, Gesture::Submit(self.input.clone()));
            return;
        }
        if let Some(deadline) = self.deadline {
            let now = Instant::now();
            if now >= deadline {
                self.apply(ctx, Gesture::TimerFired);
            } else {
                ctx.request_repaint_after(deadline - now);
            }
        }
    }

    fn header(&self, ui: &mut egui::Ui) {
        ui.label(
            RichText::new(format!("✨ {}", self.config.title))
                .text_style(TextStyle::Heading)
                .color(self.palette.text_primary),
        );
    }

    fn bubble(&self, ui: &mut egui::Ui, bubble: &Bubble) {
        let palette = &self.palette;
        let (fill, text, align, width) = match bubble.role {
            Role::User => (
                palette.user_bubble_bg,
                palette.user_bubble_fg,
                Align::Max,
                USER_BUBBLE_WIDTH,
            ),
            Role::Assistant => (
                palette.assistant_bubble_bg,
                palette.assistant_bubble_fg,
                Align::Min,
                ASSISTANT_BUBBLE_WIDTH,
            ),
        };
        let font_size = f32::from(self.config.font_size);

        ui.with_layout(Layout::top_down(align), |ui| {
            Frame::none()
                .fill(fill)
                .rounding(Rounding::same(16.0))
                .inner_margin(Margin::symmetric(14.0, 10.0))
                .show(ui, |ui| {
                    ui.set_max_width(width.min(ui.available_width()));
                    ui.vertical(|ui| {
                        for block in &bubble.blocks {
                            match block {
                                Block::Prose(spans) => {
                                    ui.label(prose_job(spans, text, font_size));
                                }
                                Block::Code(code) => {
                                    Frame::none()
                                        .fill(palette.code_bg)
                                        .rounding(Rounding::same(8.0))
                                        .inner_margin(Margin::same(8.0))
                                        .show(ui, |ui| {
                                            ui.label(
                                                RichText::new(code)
                                                    .monospace()
                                                    .color(palette.code_fg),
                                            );
                                        });
                                }
                            }
                        }
                    });
                });
        });
        ui.add_space(6.0);
    }

    fn input_row(&mut self, ui: &mut egui::Ui) -> Option<Gesture> {
        let palette = self.palette;
        let mut gesture = None;

        ui.horizontal(|ui| {
            let spacing = ui.spacing().item_spacing.x;
            let edit_width = (ui.available_width() - SEND_BUTTON_SIDE - spacing).max(0.0);

            let visuals = ui.visuals_mut();
            visuals.extreme_bg_color = palette.input_bg;
            visuals.widgets.inactive.bg_stroke = Stroke::new(1.0, palette.input_border);
            visuals.widgets.hovered.bg_stroke = Stroke::new(1.0, palette.accent_hover);
            visuals.selection.stroke = Stroke::new(1.0, palette.accent);

            let rows = input_rows(&self.input);
            let edit = ui.add(
                egui::TextEdit::multiline(&mut self.input)
                    .desired_width(edit_width)
                    .desired_rows(rows)
                    .text_color(palette.input_fg)
                    .hint_text(RichText::new("Type a reply…").color(palette.text_placeholder)),
            );
            if self.first_frame {
                edit.request_focus();
            }

            let fill = if self.send_hovered {
                palette.accent_hover
            } else {
                palette.accent
            };
            let send = ui.add(
                egui::Button::new(RichText::new("→").size(20.0).strong().color(Color32::WHITE))
                    .fill(fill)
                    .rounding(Rounding::same(SEND_BUTTON_SIDE / 2.0))
                    .min_size(Vec2::splat(SEND_BUTTON_SIDE)),
            );
            self.send_hovered = send.hovered();
            if send.clicked() {
                gesture = Some(Gesture::Submit(self.input.clone()));
            }
        });

        gesture
    }

    fn dismiss_row(&self, ui: &mut egui::Ui) -> Option<Gesture> {
        let mut gesture = None;
        ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
            let dismiss = ui.add(
                egui::Button::new(RichText::new("Dismiss").color(Color32::WHITE))
                    .fill(self.palette.accent)
                    .rounding(Rounding::same(12.0))
                    .min_size(Vec2::new(96.0, 32.0)),
            );
            if dismiss.clicked() {
                gesture = Some(Gesture::Close);
            }
        });
        gesture
    }
}

/// Remove an Enter press without modifiers so the text box never turns it
/// into a newline. Modifier+Enter passes through untouched.
fn take_bare_enter(ctx: &egui::Context) -> bool {
    ctx.input_mut(|i| {
        let before = i.events.len();
        i.events.retain(|event| {
            !matches!(
                event,
                egui::Event::Key {
                    key: Key::Enter,
                    pressed: true,
                    modifiers,
                    ..
                } if modifiers.is_none()
            )
        });
        i.events.len() != before
    })
}

/// egui ships no bold face, so bold spans are set larger at full contrast
/// and plain spans slightly softened.
fn prose_job(spans: &[Span], color: Color32, font_size: f32) -> LayoutJob {
    let mut job = LayoutJob::default();
    for span in spans {
        let (text, format) = match span {
            Span::Plain(text) => (
                text,
                TextFormat {
                    font_id: FontId::proportional(font_size),
                    color: color.gamma_multiply(0.9),
                    ..Default::default()
                },
            ),
            Span::Bold(text) => (
                text,
                TextFormat {
                    font_id: FontId::proportional(font_size + 1.0),
                    color,
                    ..Default::default()
                },
            ),
        };
        job.append(text, 0.0, format);
    }
    job
}

impl eframe::App for PopupApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.first_frame && self.config.topmost {
            ctx.send_viewport_cmd(ViewportCommand::Focus);
        }
        if self.session.is_open() {
            self.poll_gestures(ctx);
        }

        let palette = self.palette;
        egui::TopBottomPanel::top("header")
            .show_separator_line(false)
            .frame(
                Frame::none()
                    .fill(palette.window_bg)
                    .inner_margin(Margin::symmetric(20.0, 12.0)),
            )
            .show(ctx, |ui| self.header(ui));

        let footer = egui::TopBottomPanel::bottom("footer")
            .show_separator_line(false)
            .frame(
                Frame::none()
                    .fill(palette.window_bg)
                    .inner_margin(Margin::symmetric(20.0, 10.0)),
            )
            .show(ctx, |ui| {
                if self.session.wait_for_response() {
                    self.input_row(ui)
                } else {
                    self.dismiss_row(ui)
                }
            })
            .inner;

        egui::CentralPanel::default()
            .frame(
                Frame::none()
                    .fill(palette.window_bg)
                    .inner_margin(Margin::symmetric(10.0, 5.0)),
            )
            .show(ctx, |ui| {
                ScrollArea::vertical()
                    .auto_shrink([false, false])
                    .stick_to_bottom(true)
                    .show(ui, |ui| {
                        for bubble in &self.bubbles {
                            self.bubble(ui, bubble);
                        }
                    });
            });

        if let Some(gesture) = footer {
            self.apply(ctx, gesture);
        }
        self.first_frame = false;
    }
}
