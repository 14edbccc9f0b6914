use embassy_executor::Spawner;
use embassy_time::Timer;
use log::*;
use pid_regulator::pid::Mode;
use pid_regulator::regulator::regulator_task;
use pid_regulator::sample_clock::sample_tick_task;
use pid_regulator::{Event, EVENT_CHANNEL, REGULATOR_STATE};

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .format_timestamp_millis()
        .init();

    spawner.spawn(sample_tick_task()).unwrap();
    spawner.spawn(regulator_task()).unwrap();

    let sender = EVENT_CHANNEL.sender();
    sender.send(Event::SetMode(Mode::Auto)).await;

    // Step the setpoint after a while to show the regulator tracking it.
    let mut state = REGULATOR_STATE.receiver().unwrap();
    let mut laps = 0u32;
    loop {
        Timer::after_millis(250).await;
        let snapshot = state.changed().await;
        info!("{}", serde_json::to_string(&snapshot).unwrap());

        laps += 1;
        if laps == 40 {
            sender.send(Event::SetSetpoint(64)).await;
        }
    }
}
