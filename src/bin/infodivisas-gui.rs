/*!
 * Desktop dashboard for infodivisas - Chilean currency indicators from mindicador.cl
 *
 * Sections:
 * - Current value of the selected indicator
 * - Comparison with a past date or a past year's average
 * - CLP / USD converter at the current dollar rate
 * - Last 30 dollar values as a bar chart with statistics
 *
 * Every fetch runs on a background thread and reports back over a channel, tagged
 * with the request token of the widget that started it.
 */

use anyhow::Result;
use chrono::Local;
use eframe::egui;
use infodivisas::chart::{self, BarChart, GRIDLINES};
use infodivisas::converter::Converter;
use infodivisas::widget::{Loadable, RequestToken, Widget};
use infodivisas::workflow::{ComparisonMode, ComparisonOutcome, ComparisonWorkflow};
use infodivisas::{Client, ClientConfig, IndicatorId, IndicatorSnapshot, SeriesPoint};
use infodivisas::{format, stats, viz};
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;

const LOCALE: &str = "es";

fn main() -> Result<()> {
    env_logger::init();

    let client = Client::new(ClientConfig::default())?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([900.0, 760.0])
            .with_min_inner_size([640.0, 480.0])
            .with_title("InfoDivisas"),
        ..Default::default()
    };

    eframe::run_native(
        "InfoDivisas",
        options,
        Box::new(|_cc| Ok(Box::new(DashboardApp::new(client)))),
    )
    .map_err(|e| anyhow::anyhow!("{}", e))
}

/// Response of a background fetch.
enum Msg {
    Indicators(RequestToken, infodivisas::Result<Vec<IndicatorId>>),
    Current(RequestToken, infodivisas::Result<IndicatorSnapshot>),
    Rate(RequestToken, infodivisas::Result<f64>),
    Series(RequestToken, infodivisas::Result<Vec<SeriesPoint>>),
    Comparison(RequestToken, infodivisas::Result<ComparisonOutcome>),
}

struct DashboardApp {
    client: Client,
    sender: mpsc::Sender<Msg>,
    receiver: mpsc::Receiver<Msg>,

    selected: IndicatorId,
    indicators: Widget<Vec<IndicatorId>>,
    current: Widget<IndicatorSnapshot>,
    comparison: ComparisonWorkflow,

    rate: Widget<f64>,
    clp_input: String,
    usd_input: String,

    series: Widget<Vec<SeriesPoint>>,
    export_status: String,
}

impl DashboardApp {
    fn new(client: Client) -> Self {
        let (sender, receiver) = mpsc::channel();
        let mut app = Self {
            client,
            sender,
            receiver,
            selected: IndicatorId::Dolar,
            indicators: Widget::new(),
            current: Widget::new(),
            comparison: ComparisonWorkflow::new(IndicatorId::Dolar),
            rate: Widget::new(),
            clp_input: String::new(),
            usd_input: String::new(),
            series: Widget::new(),
            export_status: String::new(),
        };
        // Everything a freshly mounted page loads.
        app.fetch_indicators();
        app.fetch_current();
        app.fetch_rate();
        app.fetch_series();
        app
    }

    fn fetch_indicators(&mut self) {
        let token = self.indicators.begin();
        let (client, sender) = (self.client.clone(), self.sender.clone());
        thread::spawn(move || {
            let result = client
                .get_all_indicators()
                .map(|all| all.into_keys().collect());
            let _ = sender.send(Msg::Indicators(token, result));
        });
    }

    fn fetch_current(&mut self) {
        let token = self.current.begin();
        let (client, sender, id) = (self.client.clone(), self.sender.clone(), self.selected.clone());
        thread::spawn(move || {
            let _ = sender.send(Msg::Current(token, client.get_indicator_value(&id)));
        });
    }

    fn fetch_rate(&mut self) {
        let token = self.rate.begin();
        let (client, sender) = (self.client.clone(), self.sender.clone());
        thread::spawn(move || {
            let result = client
                .get_indicator_value(&IndicatorId::Dolar)
                .map(|s| s.value);
            let _ = sender.send(Msg::Rate(token, result));
        });
    }

    fn fetch_series(&mut self) {
        let token = self.series.begin();
        let (client, sender) = (self.client.clone(), self.sender.clone());
        thread::spawn(move || {
            let _ = sender.send(Msg::Series(
                token,
                client.get_indicator_series(&IndicatorId::Dolar),
            ));
        });
    }

    fn start_comparison(&mut self, retry: bool) {
        let today = Local::now().date_naive();
        let request = if retry {
            self.comparison.retry(today)
        } else {
            Some(self.comparison.request(today))
        };
        let Some(Ok(request)) = request else {
            // Invalid input already put the workflow in Failed.
            return;
        };
        let current = self.current.state().success().cloned();
        let (client, sender) = (self.client.clone(), self.sender.clone());
        thread::spawn(move || {
            let result = request.execute(&client, current.as_ref());
            let _ = sender.send(Msg::Comparison(request.token, result));
        });
    }

    fn drain_messages(&mut self) {
        while let Ok(msg) = self.receiver.try_recv() {
            match msg {
                Msg::Indicators(t, r) => {
                    self.indicators.finish(t, r);
                }
                Msg::Current(t, r) => {
                    self.current.finish(t, r);
                }
                Msg::Rate(t, r) => {
                    if self.rate.finish(t, r) {
                        self.recompute_conversion();
                    }
                }
                Msg::Series(t, r) => {
                    self.series.finish(t, r);
                }
                Msg::Comparison(t, r) => {
                    self.comparison.finish(t, r);
                }
            }
        }
    }

    fn any_loading(&self) -> bool {
        self.indicators.state().is_loading()
            || self.current.state().is_loading()
            || self.rate.state().is_loading()
            || self.series.state().is_loading()
            || self.comparison.is_comparing()
    }

    fn converter(&self) -> Option<Converter> {
        self.rate
            .state()
            .success()
            .and_then(|r| Converter::new(*r).ok())
    }

    fn recompute_conversion(&mut self) {
        if let Some(conv) = self.converter() {
            self.usd_input = conv.clp_field_to_usd(&self.clp_input).unwrap_or_default();
        }
    }

    fn indicator_choices(&self) -> Vec<IndicatorId> {
        match self.indicators.state() {
            Loadable::Success(ids) => ids.clone(),
            _ => IndicatorId::KNOWN.to_vec(),
        }
    }

    fn ui_current(&mut self, ui: &mut egui::Ui) {
        let known = self.indicator_choices();
        let mut choice = self.selected.clone();
        ui.horizontal(|ui| {
            ui.label("Seleccionar indicador:");
            egui::ComboBox::from_id_salt("indicator-select")
                .selected_text(choice.label())
                .show_ui(ui, |ui| {
                    for id in &known {
                        ui.selectable_value(&mut choice, id.clone(), id.label());
                    }
                });
        });
        if choice != self.selected {
            self.selected = choice.clone();
            // the comparison follows the main selection
            self.comparison.set_indicator(choice);
            self.fetch_current();
        }

        let title = match self.current.state() {
            Loadable::Success(s) => format!("Valor actual del {}", s.name),
            _ => "Valor actual del indicador".to_string(),
        };
        ui.heading(title);

        let mut retry = false;
        match self.current.state() {
            Loadable::Loading => {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label("Cargando valor actual...");
                });
            }
            Loadable::Failed(e) => {
                ui.colored_label(egui::Color32::RED, e.user_message(&self.selected.label()));
                retry = ui.button("Intentar nuevamente").clicked();
            }
            Loadable::Success(s) => {
                ui.label(
                    egui::RichText::new(format::money(s.value, 2, &s.display_unit(), LOCALE))
                        .size(32.0)
                        .strong(),
                );
                ui.label(format!("Última actualización: {}", format::long_date(s.date)));
            }
            Loadable::Idle => {
                ui.label("No hay datos disponibles.");
            }
        }
        if retry {
            self.fetch_current();
        }
    }

    fn ui_comparison(&mut self, ui: &mut egui::Ui) {
        ui.heading("Comparar con valor histórico");
        let blocked = !matches!(self.current.state(), Loadable::Success(_));

        let known = self.indicator_choices();
        let mut target = self.comparison.indicator().clone();
        ui.horizontal(|ui| {
            ui.label("Moneda a comparar:");
            egui::ComboBox::from_id_salt("compare-indicator")
                .selected_text(target.label())
                .show_ui(ui, |ui| {
                    for id in &known {
                        ui.selectable_value(&mut target, id.clone(), id.label());
                    }
                });
        });
        self.comparison.set_indicator(target);

        let mut mode = self.comparison.mode();
        ui.horizontal(|ui| {
            ui.radio_value(&mut mode, ComparisonMode::Date, "Por fecha específica");
            ui.radio_value(&mut mode, ComparisonMode::Year, "Por año");
        });
        self.comparison.set_mode(mode);

        let mut compare_clicked = false;
        ui.horizontal(|ui| match self.comparison.mode() {
            ComparisonMode::Date => {
                let mut date = self.comparison.date_input().to_string();
                ui.add_enabled(
                    !blocked,
                    egui::TextEdit::singleline(&mut date).hint_text("aaaa-mm-dd"),
                );
                self.comparison.set_date(&date);
            }
            ComparisonMode::Year => {
                let mut year = self.comparison.year_input().to_string();
                ui.add_enabled(
                    !blocked,
                    egui::TextEdit::singleline(&mut year).hint_text("Ej: 2022"),
                );
                self.comparison.set_year(&year);
            }
        });
        ui.horizontal(|ui| {
            let label = if self.comparison.is_comparing() {
                "Comparando..."
            } else {
                "Comparar"
            };
            let enabled = !blocked && !self.comparison.is_comparing();
            compare_clicked = ui.add_enabled(enabled, egui::Button::new(label)).clicked();
            if self.comparison.is_comparing() {
                ui.spinner();
            }
        });
        if compare_clicked {
            self.start_comparison(false);
        }

        let message = self.comparison.message();
        let mut retry = false;
        match self.comparison.state() {
            Loadable::Success(outcome) => {
                ui.label(format!(
                    "Valor {} {}: ${:.2} {}",
                    outcome.reference.name,
                    outcome.reference.label.describe(),
                    outcome.reference.value,
                    outcome.reference.unit
                ));
                let color = match outcome.result.direction {
                    infodivisas::compare::Direction::Increased => egui::Color32::DARK_GREEN,
                    infodivisas::compare::Direction::Decreased => egui::Color32::RED,
                    infodivisas::compare::Direction::Unchanged => egui::Color32::GRAY,
                };
                ui.colored_label(color, message.unwrap_or_default());
            }
            Loadable::Failed(_) => {
                ui.colored_label(egui::Color32::RED, message.unwrap_or_default());
                retry = ui.button("Intentar nuevamente").clicked();
            }
            _ => {}
        }
        if retry {
            self.start_comparison(true);
        }
    }

    fn ui_converter(&mut self, ui: &mut egui::Ui) {
        ui.heading("Conversor de divisas");
        let mut retry = false;
        match self.rate.state() {
            Loadable::Loading => {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label("Cargando tipo de cambio...");
                });
            }
            Loadable::Failed(e) => {
                ui.colored_label(egui::Color32::RED, e.user_message("el tipo de cambio"));
                retry = ui.button("Intentar nuevamente").clicked();
            }
            _ => {}
        }
        if retry {
            self.fetch_rate();
        }

        let Some(conv) = self.converter() else {
            return;
        };
        ui.label(format!(
            "Tipo de cambio: 1 USD = {} CLP",
            format::amount(conv.rate(), 2, LOCALE)
        ));
        ui.horizontal(|ui| {
            ui.label("CLP:");
            if ui.text_edit_singleline(&mut self.clp_input).changed() {
                self.usd_input = conv.clp_field_to_usd(&self.clp_input).unwrap_or_default();
            }
            ui.label("USD:");
            if ui.text_edit_singleline(&mut self.usd_input).changed() {
                self.clp_input = conv.usd_field_to_clp(&self.usd_input).unwrap_or_default();
            }
        });
    }

    fn ui_chart(&mut self, ui: &mut egui::Ui) {
        let mut refresh = false;
        let mut export = false;
        ui.horizontal(|ui| {
            ui.heading("Histórico del Dólar");
            ui.label("Últimos 30 días hábiles");
            refresh = ui.button("Actualizar").clicked();
            export = ui
                .add_enabled(
                    self.series.state().success().is_some(),
                    egui::Button::new("Exportar SVG"),
                )
                .clicked();
        });

        match self.series.state() {
            Loadable::Loading => {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label("Cargando datos históricos...");
                });
            }
            Loadable::Failed(e) => {
                ui.colored_label(egui::Color32::RED, e.user_message("el histórico del dólar"));
                refresh |= ui.button("Reintentar").clicked();
            }
            Loadable::Success(points) if points.is_empty() => {
                ui.label("No hay datos históricos disponibles.");
            }
            Loadable::Success(points) => {
                let s = stats::summary(points);
                ui.horizontal(|ui| {
                    let fmt0 = |v: Option<f64>| {
                        v.map(|x| format!("${}", format::amount(x, 0, LOCALE)))
                            .unwrap_or_else(|| "NA".into())
                    };
                    ui.label(format!("Promedio: {}", fmt0(s.mean)));
                    if let (Some(c), Some(p)) = (s.change, s.change_pct) {
                        let color = if c >= 0.0 {
                            egui::Color32::DARK_GREEN
                        } else {
                            egui::Color32::RED
                        };
                        ui.colored_label(color, format!("Variación: {:+.0} ({:+.2}%)", c, p));
                    }
                    ui.label(format!("Máximo: {}", fmt0(s.max)));
                    ui.label(format!("Mínimo: {}", fmt0(s.min)));
                });
                if let Ok(bars) = chart::bar_chart(points) {
                    paint_bars(ui, &bars);
                }
            }
            Loadable::Idle => {}
        }

        if export && let Some(points) = self.series.state().success() {
            let path = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("infodivisas_dolar.svg");
            self.export_status =
                match viz::plot_bars(points, &path, 1000, 400, "Histórico del Dólar", LOCALE) {
                    Ok(()) => format!("Gráfico guardado en {}", path.display()),
                    Err(e) => format!("No se pudo guardar el gráfico: {}", e),
                };
        }
        if !self.export_status.is_empty() {
            ui.label(&self.export_status);
        }
        if refresh {
            self.fetch_series();
        }
    }
}

/// Draw the chart with the egui painter: gridlines, value labels, bars, dates.
fn paint_bars(ui: &mut egui::Ui, chart: &BarChart) {
    let height = 260.0;
    let (rect, _) = ui.allocate_exact_size(
        egui::vec2(ui.available_width(), height),
        egui::Sense::hover(),
    );
    let painter = ui.painter_at(rect);
    let grid = egui::Color32::from_gray(200);
    let text = ui.visuals().text_color();
    let font = egui::FontId::proportional(11.0);

    let left = rect.left() + 60.0;
    let right = rect.right() - 8.0;
    let top = rect.top() + 16.0;
    let bottom = rect.bottom() - 24.0;
    let plot_h = bottom - top;

    let steps = (GRIDLINES - 1) as f32;
    for (i, v) in chart.value_ticks.iter().enumerate() {
        let y = top + plot_h * i as f32 / steps;
        painter.line_segment(
            [egui::pos2(left, y), egui::pos2(right, y)],
            egui::Stroke::new(1.0, grid),
        );
        painter.text(
            egui::pos2(left - 6.0, y),
            egui::Align2::RIGHT_CENTER,
            format!("${}", format::amount(*v, 0, LOCALE)),
            font.clone(),
            text,
        );
    }

    let n = chart.bars.len().max(1) as f32;
    let slot = (right - left) / n;
    for (i, bar) in chart.bars.iter().enumerate() {
        let x0 = left + slot * i as f32 + slot * 0.1;
        let x1 = x0 + slot * 0.8;
        let h = (bar.height_pct as f32 / 100.0 * plot_h).max(4.0);
        let color = if bar.is_latest {
            egui::Color32::from_rgb(237, 125, 49)
        } else {
            egui::Color32::from_rgb(68, 114, 196)
        };
        painter.rect_filled(
            egui::Rect::from_min_max(egui::pos2(x0, bottom - h), egui::pos2(x1, bottom)),
            3.0,
            color,
        );
        let cx = (x0 + x1) / 2.0;
        painter.text(
            egui::pos2(cx, bottom + 4.0),
            egui::Align2::CENTER_TOP,
            format::short_date(bar.date),
            font.clone(),
            text,
        );
        if bar.is_latest {
            painter.text(
                egui::pos2(cx, bottom - h - 2.0),
                egui::Align2::CENTER_BOTTOM,
                format!("${}", format::amount(bar.value, 0, LOCALE)),
                font.clone(),
                color,
            );
        }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_messages();

        // Keep polling the channel while anything is in flight.
        if self.any_loading() {
            ctx.request_repaint();
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.heading("InfoDivisas");
                ui.add_space(10.0);

                ui.group(|ui| self.ui_current(ui));
                ui.add_space(10.0);
                ui.group(|ui| self.ui_comparison(ui));
                ui.add_space(10.0);
                ui.group(|ui| self.ui_converter(ui));
                ui.add_space(10.0);
                ui.group(|ui| self.ui_chart(ui));
            });
        });
    }
}
