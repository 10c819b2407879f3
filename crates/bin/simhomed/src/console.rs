//! Interactive text menu over the home service.
//!
//! Reads one answer per line. Invalid answers are logged and the question is
//! asked again; end of input behaves like choosing "Quit".

use std::fmt::Write as _;
use std::io::{self, Write};
use std::str::FromStr;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};

use simhome_app::ports::{DeviceGateway, EventPublisher};
use simhome_app::services::HomeService;
use simhome_domain::automation::{Action, Comparison, Rule, Trigger};
use simhome_domain::command::{CLIMATE_TEMP_RANGE, Command, FAN_SPEED_RANGE};
use simhome_domain::device::{Device, DeviceKind, DeviceState, SensorValue};

use crate::demo::Demo;

const MENU: &str = "
===== Smart home controller =====
1. List devices
2. Control a device
3. List rules
4. Add a rule
5. Enable or disable a rule
6. Start monitoring
7. Stop monitoring
8. Run the demo scenario
9. Quit
=================================";

/// Words accepted as "on" when asking for a power state.
const YES: [&str; 5] = ["on", "1", "true", "yes", "y"];
/// Words accepted as "off".
const NO: [&str; 5] = ["off", "0", "false", "no", "n"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Choice {
    ListDevices,
    ControlDevice,
    ListRules,
    AddRule,
    ToggleRule,
    StartMonitoring,
    StopMonitoring,
    Demo,
    Quit,
}

impl FromStr for Choice {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim() {
            "1" => Self::ListDevices,
            "2" => Self::ControlDevice,
            "3" => Self::ListRules,
            "4" => Self::AddRule,
            "5" => Self::ToggleRule,
            "6" => Self::StartMonitoring,
            "7" => Self::StopMonitoring,
            "8" => Self::Demo,
            "9" => Self::Quit,
            _ => return Err(()),
        })
    }
}

pub struct Console<'a, G, P, R, W> {
    service: &'a HomeService<G, P>,
    demo: &'a Demo,
    input: Lines<R>,
    out: W,
}

impl<'a, G, P, R, W> Console<'a, G, P, R, W>
where
    G: DeviceGateway + 'static,
    P: EventPublisher + Send + Sync + 'static,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    pub fn new(service: &'a HomeService<G, P>, demo: &'a Demo, input: R, out: W) -> Self {
        Self {
            service,
            demo,
            input: input.lines(),
            out,
        }
    }

    /// Serve the menu until the user quits or input ends. The monitor is
    /// stopped on the way out.
    ///
    /// # Errors
    ///
    /// Returns an error when reading input or writing output fails.
    pub async fn run(mut self) -> io::Result<()> {
        loop {
            writeln!(self.out, "{MENU}")?;
            let Some(choice) = self.ask::<Choice>("Choose an option (1-9)", |_| true).await? else {
                break;
            };
            tracing::debug!(?choice, "menu choice");
            let keep_going = match choice {
                Choice::ListDevices => self.list_devices().await.map(|()| true),
                Choice::ControlDevice => self.control_device().await,
                Choice::ListRules => self.list_rules().await.map(|()| true),
                Choice::AddRule => self.add_rule().await,
                Choice::ToggleRule => self.toggle_rule().await,
                Choice::StartMonitoring => {
                    if self.service.start_monitoring().await {
                        writeln!(self.out, "Monitoring started")?;
                    } else {
                        writeln!(self.out, "Monitoring is already running")?;
                    }
                    Ok(true)
                }
                Choice::StopMonitoring => {
                    if self.service.stop_monitoring().await {
                        writeln!(self.out, "Monitoring stopped")?;
                    } else {
                        writeln!(self.out, "Monitoring is not running")?;
                    }
                    Ok(true)
                }
                Choice::Demo => self.demo.run(self.service, &mut self.out).await.map(|()| true),
                Choice::Quit => Ok(false),
            }?;
            if !keep_going {
                break;
            }
        }

        writeln!(self.out, "Exiting...")?;
        self.service.stop_monitoring().await;
        Ok(())
    }

    async fn list_devices(&mut self) -> io::Result<()> {
        writeln!(self.out, "\nAvailable devices:")?;
        for (idx, device) in self.service.list_devices().await.iter().enumerate() {
            writeln!(
                self.out,
                "{}. {} ({}) - {}",
                idx + 1,
                device.name,
                device.id,
                describe(&device.state)
            )?;
        }
        Ok(())
    }

    /// Returns `Ok(false)` when input ended mid-dialogue.
    async fn control_device(&mut self) -> io::Result<bool> {
        let actuators: Vec<Device> = self
            .service
            .list_devices()
            .await
            .into_iter()
            .filter(|d| !d.is_sensor())
            .collect();
        if actuators.is_empty() {
            writeln!(self.out, "No controllable devices")?;
            return Ok(true);
        }

        writeln!(self.out, "\nChoose a device to control:")?;
        self.print_numbered(&actuators)?;
        let Some(device) = self.pick(&actuators, "Device number").await? else {
            return Ok(false);
        };
        let Some(status) = self.ask_power().await? else {
            return Ok(false);
        };

        let command = match device.kind() {
            DeviceKind::Fan => {
                let (min, max) = FAN_SPEED_RANGE;
                let prompt = format!("Speed ({min}-{max})");
                let Some(speed) = self.ask::<u8>(&prompt, |s| (min..=max).contains(s)).await? else {
                    return Ok(false);
                };
                Command::fan(status, speed)
            }
            DeviceKind::Ac => {
                let (min, max) = CLIMATE_TEMP_RANGE;
                let prompt = format!("Temperature ({min}-{max})");
                let Some(temp) = self.ask::<i32>(&prompt, |t| (min..=max).contains(t)).await? else {
                    return Ok(false);
                };
                Command::climate(status, temp)
            }
            _ => Command::switch(status),
        };

        if self.service.control_device(&device.id, command).await {
            writeln!(self.out, "{}: {command}", device.name)?;
        } else {
            writeln!(self.out, "Could not control {}", device.name)?;
        }
        Ok(true)
    }

    async fn list_rules(&mut self) -> io::Result<()> {
        writeln!(self.out, "\nConfigured rules:")?;
        for (idx, rule) in self.service.list_rules().await.iter().enumerate() {
            let flag = if rule.enabled { "" } else { " [disabled]" };
            writeln!(
                self.out,
                "{}. {}{flag} - when {} {} {}, run {} action(s)",
                idx + 1,
                rule.name,
                rule.trigger.device_id,
                rule.trigger.condition,
                rule.trigger.value,
                rule.actions.len()
            )?;
        }
        Ok(())
    }

    async fn add_rule(&mut self) -> io::Result<bool> {
        let devices = self.service.list_devices().await;
        let (sensors, actuators): (Vec<Device>, Vec<Device>) =
            devices.into_iter().partition(Device::is_sensor);
        if sensors.is_empty() || actuators.is_empty() {
            writeln!(self.out, "A rule needs at least one sensor and one actuator")?;
            return Ok(true);
        }

        writeln!(self.out, "\nNew rule:")?;
        let Some(name) = self.ask::<String>("Rule name", |n| !n.trim().is_empty()).await? else {
            return Ok(false);
        };

        writeln!(self.out, "\nChoose the trigger sensor:")?;
        self.print_numbered(&sensors)?;
        let Some(sensor) = self.pick(&sensors, "Sensor number").await? else {
            return Ok(false);
        };

        let numeric = sensor.kind() == DeviceKind::TempSensor;
        let Some(condition) = self
            .ask::<Comparison>("Condition (above, below, equal)", |c| {
                numeric || !c.is_ordering()
            })
            .await?
        else {
            return Ok(false);
        };

        let value = if numeric {
            let Some(value) = self.ask::<f64>("Value", |v| v.is_finite()).await? else {
                return Ok(false);
            };
            SensorValue::Number(value)
        } else {
            let Some(value) = self.ask_flag("Value (true/false)").await? else {
                return Ok(false);
            };
            SensorValue::Flag(value)
        };

        writeln!(self.out, "\nChoose the device to act on:")?;
        self.print_numbered(&actuators)?;
        let Some(target) = self.pick(&actuators, "Device number").await? else {
            return Ok(false);
        };
        let Some(status) = self.ask_power().await? else {
            return Ok(false);
        };

        let rule = Rule::builder()
            .name(name)
            .trigger(Trigger::new(sensor.id.clone(), condition, value))
            .action(Action::new(target.id.clone(), Command::switch(status)))
            .build();
        let result = match rule {
            Ok(rule) => self.service.add_rule(rule).await,
            Err(err) => Err(err),
        };
        match result {
            Ok(()) => writeln!(self.out, "Rule added")?,
            Err(err) => {
                tracing::warn!(error = %err, "rule not added");
                writeln!(self.out, "Rule not added: {err}")?;
            }
        }
        Ok(true)
    }

    async fn toggle_rule(&mut self) -> io::Result<bool> {
        let rules = self.service.list_rules().await;
        if rules.is_empty() {
            writeln!(self.out, "No rules configured")?;
            return Ok(true);
        }
        self.list_rules().await?;
        let Some(idx) = self
            .ask::<usize>("Rule number", |i| (1..=rules.len()).contains(i))
            .await?
        else {
            return Ok(false);
        };
        let rule = &rules[idx - 1];
        let enabled = !rule.enabled;
        match self.service.set_rule_enabled(&rule.name, enabled).await {
            Ok(()) => {
                let state = if enabled { "enabled" } else { "disabled" };
                writeln!(self.out, "Rule {} {state}", rule.name)?;
            }
            Err(err) => tracing::warn!(rule = %rule.name, error = %err, "rule not toggled"),
        }
        Ok(true)
    }

    fn print_numbered(&mut self, devices: &[Device]) -> io::Result<()> {
        for (idx, device) in devices.iter().enumerate() {
            writeln!(self.out, "{}. {} ({})", idx + 1, device.name, device.id)?;
        }
        Ok(())
    }

    async fn pick<'d>(&mut self, devices: &'d [Device], prompt: &str) -> io::Result<Option<&'d Device>> {
        let idx = self
            .ask::<usize>(prompt, |i| (1..=devices.len()).contains(i))
            .await?;
        Ok(idx.map(|i| &devices[i - 1]))
    }

    async fn ask_power(&mut self) -> io::Result<Option<bool>> {
        self.ask_flag("Power (on/off)").await
    }

    async fn ask_flag(&mut self, prompt: &str) -> io::Result<Option<bool>> {
        loop {
            let Some(answer) = self.prompt(prompt).await? else {
                return Ok(None);
            };
            let answer = answer.to_ascii_lowercase();
            if YES.contains(&answer.as_str()) {
                return Ok(Some(true));
            }
            if NO.contains(&answer.as_str()) {
                return Ok(Some(false));
            }
            tracing::warn!(%answer, "expected on or off");
        }
    }

    /// Ask until the answer parses and passes `accept`. `None` on end of input.
    async fn ask<T: FromStr>(
        &mut self,
        prompt: &str,
        accept: impl Fn(&T) -> bool,
    ) -> io::Result<Option<T>> {
        loop {
            let Some(answer) = self.prompt(prompt).await? else {
                return Ok(None);
            };
            match answer.parse::<T>() {
                Ok(value) if accept(&value) => return Ok(Some(value)),
                _ => tracing::warn!(%answer, "invalid input, try again"),
            }
        }
    }

    async fn prompt(&mut self, prompt: &str) -> io::Result<Option<String>> {
        write!(self.out, "{prompt}: ")?;
        self.out.flush()?;
        let line = self.input.next_line().await?;
        Ok(line.map(|l| l.trim().to_string()))
    }
}

/// One-line summary of a device state for the device list.
fn describe(state: &DeviceState) -> String {
    if let Some(value) = state.sensor_value() {
        return format!("value: {value}");
    }
    let mut text = String::from(if state.status().unwrap_or(false) {
        "ON"
    } else {
        "OFF"
    });
    match state {
        DeviceState::Fan { speed, .. } => {
            let _ = write!(text, ", speed: {speed}");
        }
        DeviceState::Ac { temp, .. } => {
            let _ = write!(text, ", {temp}\u{b0}C");
        }
        _ => {}
    }
    text
}
