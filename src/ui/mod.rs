pub(crate) mod config;
mod dashboard_view;
mod graphs_view;
mod lap_table;

use std::time::{Duration, Instant};

use config::AppConfig;
use egui::{Color32, ViewportBuilder, ViewportId, Visuals, style::Widgets};
use log::{error, info, warn};

use vts_dashboard::{
    TelemetryLink,
    session::SessionState,
    telemetry::{LinkStatus, TelemetryOutput, TelemetryProducer, producer::available_ports},
};

pub(crate) const REFRESH_RATE_MS: u64 = 100;
const MAX_OUTPUTS_PER_REFRESH: usize = 50;
const MAX_TIME_PER_REFRESH_MS: u128 = 20;

pub(crate) const PALETTE_DARK_WINDOW: Color32 = Color32::from_rgb(30, 30, 30);
pub(crate) const PALETTE_DARK_BASE: Color32 = Color32::from_rgb(45, 45, 48);
pub(crate) const PALETTE_LIGHT_WINDOW: Color32 = Color32::from_rgb(245, 245, 245);
pub(crate) const PALETTE_LIGHT_BASE: Color32 = Color32::from_rgb(255, 255, 255);
pub(crate) const PALETTE_BLUE: Color32 = Color32::from_rgb(0, 120, 215);
pub(crate) const PALETTE_GREEN: Color32 = Color32::from_rgb(0, 168, 107);
pub(crate) const PALETTE_ORANGE: Color32 = Color32::from_rgb(255, 140, 0);
pub(crate) const PALETTE_RED: Color32 = Color32::from_rgb(231, 72, 86);
pub(crate) const PALETTE_PURPLE: Color32 = Color32::from_rgb(138, 43, 226);
pub(crate) const PALETTE_YELLOW: Color32 = Color32::from_rgb(255, 221, 0);

/// What the connect button reports.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum ConnectionState {
    Idle,
    Connected(String),
    Reconnecting,
    Failed,
    Closed,
}

/// `LiveDashboardApp` shows the rig telemetry and the heat bookkeeping.
///
/// Telemetry arrives from the reader thread through a [`TelemetryLink`]; each
/// frame drains a bounded number of readings into the [`SessionState`] and
/// advances its clocks before rendering.
pub struct LiveDashboardApp {
    link: Option<TelemetryLink>,
    connection: ConnectionState,
    session: SessionState,
    app_config: AppConfig,
    available_ports: Vec<String>,
    selected_port: String,
    selected_baud: u32,
    energy_input: String,
    input_error: Option<String>,
    show_graphs: bool,
}

impl LiveDashboardApp {
    pub(crate) fn new(app_config: AppConfig, cc: &eframe::CreationContext<'_>) -> Self {
        cc.egui_ctx.set_visuals(visuals(app_config.dark_mode));

        let available_ports = available_ports();
        let selected_port = app_config
            .port_name
            .clone()
            .or_else(|| available_ports.first().cloned())
            .unwrap_or_default();

        Self {
            link: None,
            connection: ConnectionState::Idle,
            session: SessionState::new(app_config.session_settings()),
            selected_baud: app_config.baud_rate,
            available_ports,
            selected_port,
            app_config,
            energy_input: String::new(),
            input_error: None,
            show_graphs: false,
        }
    }

    /// Starts the app already attached to a producer, used for replays.
    pub(crate) fn with_producer<P>(
        app_config: AppConfig,
        producer: P,
        cc: &eframe::CreationContext<'_>,
    ) -> Self
    where
        P: TelemetryProducer + Send + 'static,
    {
        let mut app = Self::new(app_config, cc);
        app.attach(producer);
        app
    }

    fn attach<P>(&mut self, producer: P)
    where
        P: TelemetryProducer + Send + 'static,
    {
        self.disconnect();
        match TelemetryLink::connect(producer) {
            Ok(link) => {
                self.connection = ConnectionState::Connected(link.description().to_string());
                self.link = Some(link);
                self.session.arm_sampling(Instant::now());
            }
            Err(e) => {
                warn!("Connection failed: {}", e);
                self.connection = ConnectionState::Failed;
            }
        }
    }

    fn disconnect(&mut self) {
        if let Some(mut link) = self.link.take()
            && let Err(e) = link.stop()
        {
            error!("Error while closing telemetry link: {}", e);
        }
    }

    pub(crate) fn connect_serial(&mut self) {
        let producer = vts_dashboard::SerialTelemetryProducer::new(
            self.selected_port.clone(),
            self.selected_baud,
        );
        self.attach(producer);

        if matches!(self.connection, ConnectionState::Connected(_)) {
            self.app_config.port_name = Some(self.selected_port.clone());
            self.app_config.baud_rate = self.selected_baud;
            self.save_config();
        }
    }

    pub(crate) fn refresh_ports(&mut self) {
        self.available_ports = available_ports();
    }

    pub(crate) fn toggle_theme(&mut self, ctx: &egui::Context) {
        self.app_config.dark_mode = !self.app_config.dark_mode;
        ctx.set_visuals(visuals(self.app_config.dark_mode));
        self.save_config();
    }

    fn save_config(&self) {
        if let Err(e) = self.app_config.save() {
            error!("Error while saving config file: {}", e);
        }
    }

    fn drain_telemetry(&mut self, now: Instant) {
        let Some(link) = self.link.as_ref() else {
            return;
        };

        // consume a bounded number of outputs so a chatty link cannot stall the UI
        let mut processed = 0;
        while let Some(output) = link.try_recv() {
            match output {
                TelemetryOutput::Reading(reading) => self.session.apply_reading(reading, now),
                TelemetryOutput::Link(LinkStatus::Connected(port)) => {
                    info!("Link to {} is back", port);
                    self.connection = ConnectionState::Connected(port);
                }
                TelemetryOutput::Link(LinkStatus::Reconnecting) => {
                    self.connection = ConnectionState::Reconnecting;
                }
                TelemetryOutput::Link(LinkStatus::Closed) => {
                    self.connection = ConnectionState::Closed;
                }
            }

            processed += 1;
            if processed >= MAX_OUTPUTS_PER_REFRESH
                || now.elapsed().as_millis() >= MAX_TIME_PER_REFRESH_MS
            {
                break;
            }
        }
    }
}

impl eframe::App for LiveDashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();
        self.drain_telemetry(now);
        self.session.advance(now);

        self.dashboard_view(ctx, now);

        if self.show_graphs {
            ctx.show_viewport_immediate(
                ViewportId::from_hash_of("graphs"),
                ViewportBuilder::default()
                    .with_title("Telemetry Graphs")
                    .with_inner_size([1000.0, 800.0]),
                |ctx, class| {
                    assert!(
                        class == egui::ViewportClass::Immediate,
                        "This egui backend doesn't support multiple viewports"
                    );
                    self.graphs_view(ctx);
                    if ctx.input(|i| i.viewport().close_requested()) {
                        self.show_graphs = false;
                    }
                },
            );
        }

        ctx.request_repaint_after(Duration::from_millis(self.app_config.refresh_rate_ms));
    }
}

pub(crate) fn visuals(dark_mode: bool) -> Visuals {
    if dark_mode {
        Visuals {
            dark_mode: true,
            hyperlink_color: PALETTE_BLUE,
            faint_bg_color: PALETTE_DARK_BASE,
            extreme_bg_color: PALETTE_DARK_BASE,
            panel_fill: PALETTE_DARK_WINDOW,
            window_fill: PALETTE_DARK_WINDOW,
            widgets: Widgets::dark(),
            striped: true,
            ..Visuals::dark()
        }
    } else {
        Visuals {
            dark_mode: false,
            hyperlink_color: PALETTE_BLUE,
            faint_bg_color: PALETTE_LIGHT_WINDOW,
            extreme_bg_color: PALETTE_LIGHT_BASE,
            panel_fill: PALETTE_LIGHT_WINDOW,
            window_fill: PALETTE_LIGHT_WINDOW,
            widgets: Widgets::light(),
            striped: true,
            ..Visuals::light()
        }
    }
}

/// Colour of the countdown, matching the theme.
pub(crate) fn timer_color(dark_mode: bool) -> Color32 {
    if dark_mode {
        PALETTE_YELLOW
    } else {
        PALETTE_ORANGE
    }
}
