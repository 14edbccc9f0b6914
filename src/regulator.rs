//! Main control loop: owns the controller state, the output stage and the
//! collaborator handles, consumes due-sample signals and operator events,
//! and publishes a state snapshot every lap.

use crate::log::*;
use embassy_time::Timer;

use crate::actuator::PwmActuator;
use crate::nv_store::{NvStorage, ParamStore};
use crate::output::OutputStage;
use crate::pid::{Mode, NoRecorder, Pid, TermRecorder};
use crate::process_sensor::ProcessSensor;
use crate::sample_clock::SampleFlag;
use crate::{Event, RegulatorState, EVENT_CHANNEL, LOOP_TICK_MILLIS, REGULATOR_STATE, VERSION};

pub struct Regulator<S, A, N, R = NoRecorder>
where
    S: ProcessSensor,
    A: PwmActuator,
    N: NvStorage,
    R: TermRecorder,
{
    pid: Pid,
    output: OutputStage<A>,
    sensor: S,
    store: ParamStore<N>,
    flag: &'static SampleFlag,
    recorder: R,
}

impl<S, A, N> Regulator<S, A, N>
where
    S: ProcessSensor,
    A: PwmActuator,
    N: NvStorage,
{
    /// Zeroed controller in manual mode. Call `init` (or `run`, which does)
    /// to command a safe output and pull persisted parameters in.
    pub fn new(sensor: S, actuator: A, storage: N, flag: &'static SampleFlag) -> Self {
        Self {
            pid: Pid::new(),
            output: OutputStage::new(actuator),
            sensor,
            store: ParamStore::new(storage),
            flag,
            recorder: NoRecorder,
        }
    }
}

impl<S, A, N, R> Regulator<S, A, N, R>
where
    S: ProcessSensor,
    A: PwmActuator,
    N: NvStorage,
    R: TermRecorder,
{
    /// Swap in a term recorder for diagnostics.
    pub fn with_recorder<R2: TermRecorder>(self, recorder: R2) -> Regulator<S, A, N, R2> {
        Regulator {
            pid: self.pid,
            output: self.output,
            sensor: self.sensor,
            store: self.store,
            flag: self.flag,
            recorder,
        }
    }

    /// Startup sequence: actuator to zero, then restore persisted
    /// parameters. Loaded values are taken as-is.
    pub fn init(&mut self) {
        self.output.set(0);
        self.store.load(&mut self.pid);
        info!(
            "pid regulator {} up, setpoint {} gains {}/{}/{}",
            VERSION,
            self.pid.setpoint(),
            self.pid.gains().p,
            self.pid.gains().i,
            self.pid.gains().d
        );
    }

    /// One main-loop lap. The measurement is refreshed unconditionally so
    /// the derivative reference tracks the process even while the law is
    /// skipped; the law itself runs only on a due sample in auto mode. In
    /// manual mode the flag is left alone, so a pending sample is picked up
    /// by the first automatic lap.
    pub fn run_cycle(&mut self) {
        self.pid.observe(self.sensor.read());

        if self.pid.mode() == Mode::Auto && self.flag.take() {
            let u = self.pid.control(&mut self.recorder);
            self.output.set(u);
        }
    }

    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::SetMode(mode) => {
                info!("mode -> {}", mode_name(mode));
                self.pid.set_mode(mode);
            }
            Event::SetSetpoint(setpoint) => {
                info!("setpoint -> {}", setpoint);
                self.pid.set_setpoint(setpoint);
            }
            Event::SetGains(gains) => {
                info!("gains -> {}/{}/{}", gains.p, gains.i, gains.d);
                self.pid.set_gains(gains);
            }
            Event::SetOutput(duty) => {
                if self.pid.mode() == Mode::Manual {
                    self.output.set(i64::from(duty));
                } else {
                    warn!("ignoring manual output {} while in auto", duty);
                }
            }
            Event::SaveParameters => {
                self.store.save(&self.pid);
                info!("parameters saved");
            }
            Event::LoadParameters => {
                self.store.load(&mut self.pid);
                info!("parameters loaded");
            }
        }
    }

    fn publish_state(&self) {
        REGULATOR_STATE.sender().send(RegulatorState {
            mode: self.pid.mode(),
            setpoint: self.pid.setpoint(),
            process_value: self.pid.process_value(),
            error_sum: self.pid.error_sum(),
            output: self.output.get(),
            gains: self.pid.gains(),
        });
    }

    /// Run forever. Mode changes are the only abort primitive; nothing here
    /// blocks for longer than one collaborator call.
    pub async fn run(&mut self) -> ! {
        self.init();
        let receiver = EVENT_CHANNEL.receiver();
        loop {
            while let Ok(event) = receiver.try_receive() {
                self.handle_event(event);
            }
            self.run_cycle();
            self.publish_state();
            Timer::after_millis(LOOP_TICK_MILLIS.into()).await;
        }
    }

    pub fn pid(&self) -> &Pid {
        &self.pid
    }

    pub fn last_output(&self) -> u8 {
        self.output.get()
    }
}

fn mode_name(mode: Mode) -> &'static str {
    match mode {
        Mode::Manual => "manual",
        Mode::Auto => "auto",
    }
}

#[cfg(feature = "std")]
#[embassy_executor::task]
pub async fn regulator_task() -> ! {
    use crate::nv_store_sim::RamStorage;
    use crate::pid::Gains;
    use crate::plant_sim::SimulatedPlant;
    use crate::sample_clock::SAMPLE_FLAG;

    // One-time provisioning a real device would get at the factory: without
    // it the first load reads back erased-store garbage.
    let mut storage = RamStorage::new();
    let mut defaults = Pid::new().with_gains(Gains { p: 40, i: 4, d: 24 });
    defaults.set_setpoint(128);
    ParamStore::new(&mut storage).save(&defaults);

    let plant = SimulatedPlant::new(0.0);
    let (sensor, drive) = plant.split();

    let mut regulator = Regulator::new(sensor, drive, storage, &SAMPLE_FLAG);
    regulator.run().await
}
