//! Optional GPU power readings for the overlay's status line.
//!
//! Sensors report milliwatts or `None` when no reading is available; the
//! overlay simply leaves the power figure out in that case.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::{debug, info};

pub const DEFAULT_REFRESH: Duration = Duration::from_millis(500);

const DRM_CLASS_DIR: &str = "/sys/class/drm";
const POWER_FILES: [&str; 2] = ["power1_average", "power1_input"];

pub trait PowerSensor {
    fn read_power_mw(&mut self) -> Option<u32>;
}

/// Sensor that never has a reading.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPowerSensor;

impl PowerSensor for NoPowerSensor {
    fn read_power_mw(&mut self) -> Option<u32> {
        None
    }
}

/// Reads a hwmon power file exposed by the kernel GPU driver (microwatts).
#[derive(Debug, Clone)]
pub struct HwmonPowerSensor {
    path: PathBuf,
}

impl HwmonPowerSensor {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Finds the first `card*/device/hwmon/hwmon*/power1_{average,input}`.
    pub fn discover() -> Option<Self> {
        Self::discover_in(Path::new(DRM_CLASS_DIR))
    }

    pub fn discover_in(drm_root: &Path) -> Option<Self> {
        let mut cards: Vec<PathBuf> = fs::read_dir(drm_root)
            .ok()?
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| {
                path.file_name()
                    .and_then(|name| name.to_str())
                    .is_some_and(|name| {
                        name.strip_prefix("card").is_some_and(|rest| {
                            !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit())
                        })
                    })
            })
            .collect();
        cards.sort();

        for card in cards {
            let hwmon_root = card.join("device").join("hwmon");
            let Ok(entries) = fs::read_dir(&hwmon_root) else {
                continue;
            };
            let mut monitors: Vec<PathBuf> =
                entries.filter_map(Result::ok).map(|entry| entry.path()).collect();
            monitors.sort();
            for monitor in monitors {
                for file in POWER_FILES {
                    let candidate = monitor.join(file);
                    if candidate.is_file() {
                        debug!(path = %candidate.display(), "found GPU power sensor");
                        return Some(Self::new(candidate));
                    }
                }
            }
        }
        None
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PowerSensor for HwmonPowerSensor {
    fn read_power_mw(&mut self) -> Option<u32> {
        let raw = fs::read_to_string(&self.path).ok()?;
        let microwatts: u64 = raw.trim().parse().ok()?;
        u32::try_from(microwatts / 1000).ok()
    }
}

/// Re-reads the inner sensor at most once per refresh interval.
#[derive(Debug, Clone)]
pub struct CachedPowerSensor<S> {
    inner: S,
    refresh: Duration,
    last: Option<(Instant, Option<u32>)>,
}

impl<S: PowerSensor> CachedPowerSensor<S> {
    pub fn new(inner: S, refresh: Duration) -> Self {
        Self {
            inner,
            refresh,
            last: None,
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn read_at(&mut self, now: Instant) -> Option<u32> {
        if let Some((at, value)) = self.last {
            if now.saturating_duration_since(at) < self.refresh {
                return value;
            }
        }
        let value = self.inner.read_power_mw();
        self.last = Some((now, value));
        value
    }
}

impl<S: PowerSensor> PowerSensor for CachedPowerSensor<S> {
    fn read_power_mw(&mut self) -> Option<u32> {
        self.read_at(Instant::now())
    }
}

/// Picks the sensor for this run, logging whether power will be shown.
pub fn default_sensor(enabled: bool) -> Box<dyn PowerSensor> {
    if !enabled {
        return Box::new(NoPowerSensor);
    }
    match HwmonPowerSensor::discover() {
        Some(sensor) => {
            info!(path = %sensor.path().display(), "GPU power monitoring enabled");
            Box::new(CachedPowerSensor::new(sensor, DEFAULT_REFRESH))
        }
        None => {
            info!("no GPU power sensor found; power monitoring disabled");
            Box::new(NoPowerSensor)
        }
    }
}
