//! In-memory fakes of the ports, shared by the unit tests of this crate.

use std::collections::{BTreeMap, HashSet};
use std::future::Future;
use std::sync::{Arc, Mutex};

use simhome_domain::command::Command;
use simhome_domain::device::{Device, DeviceState, SensorValue};
use simhome_domain::error::{NotFoundError, SimHomeError};
use simhome_domain::event::Event;
use simhome_domain::id::DeviceId;

use chrono::NaiveTime;

use crate::ports::{AnalogInput, Clock, DeviceGateway, DigitalOutput, EventPublisher};

// ── Fake simulator ─────────────────────────────────────────────────

#[derive(Default)]
struct FakeState {
    devices: BTreeMap<DeviceId, Device>,
    commands: Vec<(DeviceId, Command)>,
    rejected: HashSet<DeviceId>,
    offline: bool,
    corrupt_state: bool,
}

/// Simulator double. Clones share state so a test keeps a handle after
/// handing one to the registry.
#[derive(Clone, Default)]
pub(crate) struct FakeGateway {
    state: Arc<Mutex<FakeState>>,
}

impl FakeGateway {
    pub(crate) fn with(devices: Vec<Device>) -> Self {
        let gateway = Self::default();
        {
            let mut state = gateway.state.lock().unwrap();
            state.devices = devices.into_iter().map(|d| (d.id.clone(), d)).collect();
        }
        gateway
    }

    pub(crate) fn set_value(&self, id: &str, value: SensorValue) {
        let mut state = self.state.lock().unwrap();
        state
            .devices
            .get_mut(id)
            .unwrap()
            .set_sensor_value(value)
            .unwrap();
    }

    pub(crate) fn remove(&self, id: &str) {
        self.state.lock().unwrap().devices.remove(id);
    }

    pub(crate) fn set_offline(&self, offline: bool) {
        self.state.lock().unwrap().offline = offline;
    }

    pub(crate) fn set_corrupt_state(&self, corrupt: bool) {
        self.state.lock().unwrap().corrupt_state = corrupt;
    }

    pub(crate) fn reject_commands_for(&self, id: &str) {
        self.state
            .lock()
            .unwrap()
            .rejected
            .insert(DeviceId::new(id).unwrap());
    }

    pub(crate) fn commands(&self) -> Vec<(DeviceId, Command)> {
        self.state.lock().unwrap().commands.clone()
    }

    pub(crate) fn device(&self, id: &str) -> Option<Device> {
        self.state.lock().unwrap().devices.get(id).cloned()
    }
}

fn offline_error() -> SimHomeError {
    SimHomeError::Transport(Box::new(std::io::Error::new(
        std::io::ErrorKind::ConnectionRefused,
        "simulator offline",
    )))
}

impl DeviceGateway for FakeGateway {
    async fn fetch_devices(&mut self) -> Result<Vec<Device>, SimHomeError> {
        let state = self.state.lock().unwrap();
        if state.offline {
            return Err(offline_error());
        }
        Ok(state.devices.values().cloned().collect())
    }

    async fn fetch_device(&mut self, id: &DeviceId) -> Result<Device, SimHomeError> {
        let state = self.state.lock().unwrap();
        if state.offline {
            return Err(offline_error());
        }
        if state.corrupt_state {
            let err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
            return Err(SimHomeError::Decode(err));
        }
        state.devices.get(id).cloned().ok_or_else(|| {
            NotFoundError {
                entity: "Device",
                id: id.to_string(),
            }
            .into()
        })
    }

    async fn send_command(&mut self, id: &DeviceId, command: &Command) -> Result<(), SimHomeError> {
        let mut state = self.state.lock().unwrap();
        if state.offline {
            return Err(offline_error());
        }
        state.commands.push((id.clone(), *command));
        if state.rejected.contains(id) {
            return Err(SimHomeError::Transport(Box::new(std::io::Error::other(
                "ERROR",
            ))));
        }
        if let Some(device) = state.devices.get_mut(id) {
            device.apply(command)?;
        }
        Ok(())
    }

    async fn fetch_sensor_values(&mut self) -> Result<Vec<(DeviceId, SensorValue)>, SimHomeError> {
        let state = self.state.lock().unwrap();
        if state.offline {
            return Err(offline_error());
        }
        Ok(state
            .devices
            .values()
            .filter_map(|d| d.sensor_value().map(|v| (d.id.clone(), v)))
            .collect())
    }
}

// ── Spy publisher ──────────────────────────────────────────────────

#[derive(Clone, Default)]
pub(crate) struct SpyPublisher {
    events: Arc<Mutex<Vec<Event>>>,
}

impl SpyPublisher {
    pub(crate) fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }
}

impl EventPublisher for SpyPublisher {
    fn publish(&self, event: Event) -> impl Future<Output = Result<(), SimHomeError>> + Send {
        self.events.lock().unwrap().push(event);
        async { Ok(()) }
    }
}

// ── Fixtures ───────────────────────────────────────────────────────

pub(crate) fn id(raw: &str) -> DeviceId {
    DeviceId::new(raw).unwrap()
}

pub(crate) fn temp_sensor(raw: &str, value: f64) -> Device {
    Device::new(id(raw), "Temperature", DeviceState::TempSensor { value })
}

pub(crate) fn motion_sensor(raw: &str, value: bool) -> Device {
    Device::new(id(raw), "Motion", DeviceState::MotionSensor { value })
}

pub(crate) fn fan(raw: &str) -> Device {
    Device::new(
        id(raw),
        "Fan",
        DeviceState::Fan {
            status: false,
            speed: 1,
        },
    )
}

pub(crate) fn light(raw: &str) -> Device {
    Device::new(id(raw), "Light", DeviceState::Light { status: false })
}

// ── GPIO doubles ───────────────────────────────────────────────────

/// Output pin recording every level written to it.
#[derive(Clone, Default)]
pub(crate) struct RecordingPin {
    writes: Arc<Mutex<Vec<bool>>>,
}

impl RecordingPin {
    pub(crate) fn writes(&self) -> Vec<bool> {
        self.writes.lock().unwrap().clone()
    }
}

impl DigitalOutput for RecordingPin {
    fn write(&mut self, high: bool) {
        self.writes.lock().unwrap().push(high);
    }
}

/// Analog input whose raw reading the test can change.
#[derive(Clone, Default)]
pub(crate) struct SharedAnalog {
    raw: Arc<Mutex<u16>>,
}

impl SharedAnalog {
    pub(crate) fn set(&self, raw: u16) {
        *self.raw.lock().unwrap() = raw;
    }
}

impl AnalogInput for SharedAnalog {
    fn read(&mut self) -> u16 {
        *self.raw.lock().unwrap()
    }
}

/// Clock advancing with tokio's (pausable) time from a fixed start.
pub(crate) struct TokioClock {
    start: NaiveTime,
    origin: tokio::time::Instant,
}

impl TokioClock {
    pub(crate) fn starting_at(hour: u32, minute: u32, second: u32) -> Self {
        Self {
            start: NaiveTime::from_hms_opt(hour, minute, second).unwrap(),
            origin: tokio::time::Instant::now(),
        }
    }
}

impl Clock for TokioClock {
    fn time_of_day(&self) -> NaiveTime {
        let elapsed = chrono::Duration::from_std(self.origin.elapsed()).unwrap();
        self.start + elapsed
    }
}
