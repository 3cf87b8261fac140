// filepath: src/app.rs
//! Preview application state for unlock-indicator
//!
//! One overlay layer surface is opened per output. The indicator composes
//! a single frame covering the bounding box of all outputs, and each
//! surface receives its own slice of that frame.

use log::{debug, info, warn};
use smithay_client_toolkit::{
    compositor::CompositorState,
    output::OutputState,
    registry::RegistryState,
    seat::{keyboard::Modifiers, SeatState},
    shell::{
        wlr_layer::{Anchor, KeyboardInteractivity, Layer, LayerShell, LayerSurface},
        WaylandSurface,
    },
    shm::{slot::SlotPool, Shm},
};
use std::time::Duration;
use unlock_indicator::{
    AuthState, DisplayBackend, IndicatorError, Region, Resolution, Surface, UnlockIndicator,
};
use wayland_client::protocol::{wl_keyboard, wl_output, wl_shm};
use wayland_client::QueueHandle;

use calloop::timer::{TimeoutAction, Timer};
use calloop::{LoopHandle, RegistrationToken};

use crate::session::{Deadline, Scheduler, Session};

/// One output and the layer surface covering it.
pub struct Screen {
    output: wl_output::WlOutput,
    layer: LayerSurface,
    position: (i32, i32),
    size: (u32, u32),
    scale: i32,
    configured: bool,
}

/// All outputs; the display side of the indicator.
pub struct Screens {
    screens: Vec<Screen>,
    pool: SlotPool,
    modifiers: Option<String>,
}

impl Screens {
    pub fn new(pool: SlotPool) -> Self {
        Self {
            screens: Vec::new(),
            pool,
            modifiers: None,
        }
    }

    pub fn add(&mut self, output: wl_output::WlOutput, layer: LayerSurface) {
        self.screens.push(Screen {
            output,
            layer,
            position: (0, 0),
            size: (0, 0),
            scale: 1,
            configured: false,
        });
    }

    pub fn remove(&mut self, output: &wl_output::WlOutput) {
        self.screens.retain(|s| &s.output != output);
    }

    pub fn remove_layer(&mut self, layer: &LayerSurface) {
        self.screens
            .retain(|s| s.layer.wl_surface() != layer.wl_surface());
    }

    pub fn is_empty(&self) -> bool {
        self.screens.is_empty()
    }

    /// Refresh position, size and scale from the compositor's output info.
    pub fn update_output(&mut self, output_state: &OutputState, output: &wl_output::WlOutput) {
        let Some(info) = output_state.info(output) else {
            return;
        };
        if let Some(screen) = self.screens.iter_mut().find(|s| &s.output == output) {
            if let Some(position) = info.logical_position {
                screen.position = position;
            }
            if let Some((w, h)) = info.logical_size {
                if !screen.configured {
                    screen.size = (w.max(0) as u32, h.max(0) as u32);
                }
            }
            screen.scale = info.scale_factor.max(1);
            debug!(
                "Output {:?}: position {:?}, size {:?}, scale {}",
                info.name, screen.position, screen.size, screen.scale
            );
        }
    }

    /// Record a configure; returns true once every surface has been configured.
    pub fn configure(&mut self, layer: &LayerSurface, width: u32, height: u32) -> bool {
        let target = layer.wl_surface();
        if let Some(screen) = self.screens.iter_mut().find(|s| s.layer.wl_surface() == target) {
            if width != 0 && height != 0 {
                screen.size = (width, height);
            }
            screen.configured = true;
        }
        self.screens.iter().all(|s| s.configured)
    }

    pub fn set_modifiers(&mut self, modifiers: &Modifiers) {
        let mut active = Vec::new();
        if modifiers.caps_lock {
            active.push("Caps Lock");
        }
        if modifiers.num_lock {
            active.push("Num Lock");
        }
        self.modifiers = (!active.is_empty()).then(|| active.join(", "));
    }

    fn scale(&self) -> i32 {
        self.screens.iter().map(|s| s.scale).max().unwrap_or(1)
    }

    fn origin(&self) -> (i32, i32) {
        let x = self.screens.iter().map(|s| s.position.0).min().unwrap_or(0);
        let y = self.screens.iter().map(|s| s.position.1).min().unwrap_or(0);
        (x, y)
    }

    /// Physical rectangle of a screen inside the combined frame.
    fn frame_region(&self, screen: &Screen) -> Region {
        let scale = self.scale();
        let (ox, oy) = self.origin();
        Region::new(
            (screen.position.0 - ox) * scale,
            (screen.position.1 - oy) * scale,
            screen.size.0 * scale as u32,
            screen.size.1 * scale as u32,
        )
    }
}

impl DisplayBackend for Screens {
    fn scaling_factor(&self) -> f64 {
        f64::from(self.scale())
    }

    fn regions(&self) -> Vec<Region> {
        self.screens
            .iter()
            .filter(|s| s.size.0 > 0 && s.size.1 > 0)
            .map(|s| self.frame_region(s))
            .collect()
    }

    fn resolution(&self) -> Resolution {
        let regions = self.regions();
        let width = regions.iter().map(|r| r.x + r.width as i32).max().unwrap_or(0);
        let height = regions.iter().map(|r| r.y + r.height as i32).max().unwrap_or(0);
        Resolution::new(width.max(0) as u32, height.max(0) as u32)
    }

    fn modifier_label(&self) -> Option<String> {
        self.modifiers.clone()
    }

    fn publish(&mut self, frame: Surface) -> unlock_indicator::Result<()> {
        let scale = self.scale();
        for screen in self.screens.iter().filter(|s| s.configured) {
            let region = self.frame_region(screen);
            if region.width == 0 || region.height == 0 {
                continue;
            }
            let stride = region.width as i32 * 4;
            let (buffer, canvas) = self
                .pool
                .create_buffer(
                    region.width as i32,
                    region.height as i32,
                    stride,
                    wl_shm::Format::Argb8888,
                )
                .map_err(|e| IndicatorError::display(format!("buffer allocation failed: {e}")))?;
            frame.copy_rect_into(
                region.x,
                region.y,
                region.width,
                region.height,
                canvas,
                stride as usize,
            );

            let surface = screen.layer.wl_surface();
            surface.set_buffer_scale(scale);
            buffer
                .attach_to(surface)
                .map_err(|e| IndicatorError::display(format!("buffer attach failed: {e:?}")))?;
            surface.damage_buffer(0, 0, region.width as i32, region.height as i32);
            surface.commit();
        }
        // The frame is dropped here; the shm buffers now hold the pixels.
        Ok(())
    }
}

pub struct AppData {
    pub(crate) registry_state: RegistryState,
    pub(crate) output_state: OutputState,
    pub(crate) seat_state: SeatState,
    pub(crate) compositor_state: CompositorState,
    pub(crate) shm_state: Shm,
    layer_shell: LayerShell,
    pub(crate) screens: Screens,
    pub(crate) keyboard: Option<wl_keyboard::WlKeyboard>,
    pub(crate) modifiers: Modifiers,
    pub(crate) session: Session<LoopHandle<'static, AppData>>,
    ready: bool,
    pub(crate) exit: bool,
}

impl Scheduler for LoopHandle<'static, AppData> {
    type Token = RegistrationToken;

    fn schedule(&mut self, delay: Duration, deadline: Deadline) -> Option<RegistrationToken> {
        let inserted = self.insert_source(Timer::from_duration(delay), move |_, _, app: &mut AppData| {
            app.deadline_reached(deadline);
            TimeoutAction::Drop
        });
        match inserted {
            Ok(token) => Some(token),
            Err(e) => {
                warn!("Failed to schedule {deadline:?}: {e}");
                None
            }
        }
    }

    fn cancel(&mut self, token: RegistrationToken) {
        self.remove(token);
    }
}

impl AppData {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        registry_state: RegistryState,
        output_state: OutputState,
        seat_state: SeatState,
        compositor_state: CompositorState,
        shm_state: Shm,
        layer_shell: LayerShell,
        pool: SlotPool,
        indicator: UnlockIndicator,
        preview_password: Option<String>,
        loop_handle: LoopHandle<'static, AppData>,
    ) -> Self {
        Self {
            registry_state,
            output_state,
            seat_state,
            compositor_state,
            shm_state,
            layer_shell,
            screens: Screens::new(pool),
            keyboard: None,
            modifiers: Modifiers::default(),
            session: Session::new(indicator, loop_handle, preview_password),
            ready: false,
            exit: false,
        }
    }

    /// Open an overlay surface on a newly announced output.
    pub fn add_output(&mut self, qh: &QueueHandle<Self>, output: wl_output::WlOutput) {
        let surface = self.compositor_state.create_surface(qh);
        let layer = self.layer_shell.create_layer_surface(
            qh,
            surface,
            Layer::Overlay,
            Some("unlock-indicator"),
            Some(&output),
        );
        layer.set_anchor(Anchor::TOP | Anchor::BOTTOM | Anchor::LEFT | Anchor::RIGHT);
        layer.set_keyboard_interactivity(KeyboardInteractivity::Exclusive);
        layer.set_exclusive_zone(-1);
        layer.set_size(0, 0);
        layer.wl_surface().commit();

        self.screens.add(output.clone(), layer);
        self.screens.update_output(&self.output_state, &output);
        info!("Layer surface created for new output");
    }

    pub fn redraw(&mut self) {
        if let Err(e) = self.session.indicator_mut().redraw(&mut self.screens) {
            warn!("Redraw failed: {e}");
        }
    }

    /// Called whenever every surface has been configured. The first call
    /// settles the auth state, later ones just redraw at the new size.
    pub fn screens_ready(&mut self) {
        if self.ready {
            self.redraw();
            return;
        }
        self.ready = true;
        let auth = if self.keyboard.is_some() {
            AuthState::Idle
        } else {
            warn!("No keyboard available, cannot take input");
            AuthState::LockFailed
        };
        self.set_auth_state(auth);
    }

    pub fn set_auth_state(&mut self, auth: AuthState) {
        if let Err(e) = self.session.indicator_mut().set_auth_state(auth, &mut self.screens) {
            warn!("Redraw failed: {e}");
        }
    }

    fn deadline_reached(&mut self, deadline: Deadline) {
        debug!("Timer fired: {deadline:?}");
        if let Err(e) = self.session.on_deadline(deadline, &mut self.screens) {
            warn!("Redraw failed: {e}");
        }
        if self.session.unlocked() {
            info!("Preview password accepted, exiting");
            self.exit = true;
        }
    }

    pub fn close_layer_surface(&mut self, layer: &LayerSurface) {
        self.screens.remove_layer(layer);
        info!("Layer surface closed");
        if self.screens.is_empty() {
            self.exit = true;
        }
    }
}
