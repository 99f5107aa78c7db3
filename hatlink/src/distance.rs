//! Distance sensor device.
//!
//! A `DistanceSensor` validates the attached device, owns the per-instance
//! range trigger and gate, and exposes edge-triggered range events plus
//! blocking range waits over the reading stream.

use crate::dispatch::{SampleDispatcher, TapKind};
use crate::gate::BlockingGate;
use crate::range::{RangeEvent, RangeTrigger};
use hatlink_common::config::DistanceSensorConfig;
use hatlink_common::consts::{DISTANCE_SENSOR_TYPE_ID, NO_READING};
use hatlink_common::driver::DistanceDriver;
use hatlink_common::error::DeviceError;
use hatlink_common::types::{Port, ReportChannels};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::info;

/// User handlers for the two range edges.
#[derive(Default)]
struct RangeHandlers {
    in_range: Option<Box<dyn FnMut() + Send>>,
    out_of_range: Option<Box<dyn FnMut() + Send>>,
}

/// One attached distance sensor.
pub struct DistanceSensor {
    driver: Arc<dyn DistanceDriver>,
    port: Port,
    trigger: Arc<Mutex<RangeTrigger>>,
    handlers: Arc<Mutex<RangeHandlers>>,
    gate: Arc<BlockingGate<i32>>,
}

impl std::fmt::Debug for DistanceSensor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DistanceSensor")
            .field("port", &self.port)
            .finish_non_exhaustive()
    }
}

impl DistanceSensor {
    /// Attach a distance sensor on `port`.
    ///
    /// Validates the reported device type, reverses the sign convention,
    /// selects distance reporting and registers the reading fan-out.
    ///
    /// # Errors
    ///
    /// `DeviceError::NotADistanceSensor` if the attached device reports a
    /// different type; `DeviceError::Config` if `config` fails validation.
    pub fn attach(
        driver: Arc<dyn DistanceDriver>,
        port: Port,
        config: DistanceSensorConfig,
    ) -> Result<Self, DeviceError> {
        config.validate()?;
        let device = driver.info()?;
        if device.type_id != DISTANCE_SENSOR_TYPE_ID {
            return Err(DeviceError::NotADistanceSensor {
                port,
                found: device.type_id,
            });
        }
        driver.reverse()?;
        driver.select_reporting(ReportChannels::DISTANCE)?;

        let trigger = Arc::new(Mutex::new(RangeTrigger::new(config.threshold_distance)));
        let handlers: Arc<Mutex<RangeHandlers>> = Arc::new(Mutex::new(RangeHandlers::default()));
        let gate = Arc::new(BlockingGate::new());
        let dispatcher = Arc::new(SampleDispatcher::new());

        // Range tap first, wait tap second: edge events fire before any
        // blocked waiter is released, matching reading arrival order.
        let range_tap = {
            let trigger = trigger.clone();
            let handlers = handlers.clone();
            Box::new(move |distance: &i32| {
                let event = trigger
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .observe(*distance);
                if let Some(event) = event {
                    let mut handlers = handlers.lock().unwrap_or_else(PoisonError::into_inner);
                    match event {
                        RangeEvent::Entered => {
                            if let Some(handler) = handlers.in_range.as_mut() {
                                handler();
                            }
                        }
                        RangeEvent::Left => {
                            if let Some(handler) = handlers.out_of_range.as_mut() {
                                handler();
                            }
                        }
                    }
                }
            })
        };
        dispatcher.register(TapKind::Range, range_tap);

        let wait_tap = {
            let gate = gate.clone();
            Box::new(move |distance: &i32| {
                gate.post(*distance);
            })
        };
        dispatcher.register(TapKind::Wait, wait_tap);

        let fan_out = dispatcher.clone();
        driver.set_callback(Box::new(move |distance| fan_out.dispatch(&distance)))?;

        info!("distance sensor attached on port {}", port);

        Ok(Self {
            driver,
            port,
            trigger,
            handlers,
            gate,
        })
    }

    #[inline]
    pub const fn port(&self) -> Port {
        self.port
    }

    /// Last delivered reading, [`NO_READING`] before the first.
    pub fn distance(&self) -> i32 {
        self.gate.latest().unwrap_or(NO_READING)
    }

    /// Synchronous point read through the driver.
    pub fn get_distance(&self) -> Result<i32, DeviceError> {
        Ok(self.driver.read_distance()?)
    }

    pub fn threshold_distance(&self) -> i32 {
        self.trigger
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .threshold()
    }

    /// Change the hysteresis threshold for subsequent readings.
    pub fn set_threshold_distance(&self, distance: i32) {
        self.trigger
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .set_threshold(distance);
    }

    /// Register `handler` for the in-range edge. Runs in the delivery
    /// context and must not block.
    pub fn on_in_range<F>(&self, handler: F)
    where
        F: FnMut() + Send + 'static,
    {
        self.handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .in_range = Some(Box::new(handler));
    }

    /// Register `handler` for the out-of-range edge. Runs in the delivery
    /// context and must not block.
    pub fn on_out_of_range<F>(&self, handler: F)
    where
        F: FnMut() + Send + 'static,
    {
        self.handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .out_of_range = Some(Box::new(handler));
    }

    /// Block until a valid reading closer than `bound` arrives, and return
    /// it. Sentinel readings never satisfy the wait. No timeout: if no
    /// such reading ever arrives, the caller blocks indefinitely.
    pub fn wait_for_in_range(&self, bound: i32) -> i32 {
        self.gate
            .wait_until(|distance| *distance != NO_READING && *distance < bound)
    }

    /// Block until a valid reading farther than `bound` arrives, and
    /// return it. Sentinel readings never satisfy the wait.
    pub fn wait_for_out_of_range(&self, bound: i32) -> i32 {
        self.gate
            .wait_until(|distance| *distance != NO_READING && *distance > bound)
    }
}
