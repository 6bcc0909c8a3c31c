//! Known sensor devices on the telemetry network
//!
//! Link ids start at 1 because id 0 is the coordinator.

/// Sensor device catalogue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceId {
    /// Temperature and humidity sensor
    Dht22,
    /// CO, NH3 and NO2 sensor
    Mics6814,
    /// Loudness and lightness sensor
    Ky038,
    /// Accelerometer, temperature, pressure, altitude and compass
    Gy87,
    /// Air quality sensor
    Ccs811,
    /// Nova particulate matter sensor
    PmSds011,
    /// The device's own battery monitor
    Battery,
}

impl DeviceId {
    /// Every catalogued device, in link-id order
    pub const ALL: [DeviceId; 7] = [
        DeviceId::Dht22,
        DeviceId::Mics6814,
        DeviceId::Ky038,
        DeviceId::Gy87,
        DeviceId::Ccs811,
        DeviceId::PmSds011,
        DeviceId::Battery,
    ];

    /// Address on the bit-link
    pub const fn link_id(self) -> u16 {
        self as u16 + 1
    }

    /// Look up a device by its link address
    pub fn from_link_id(id: u16) -> Option<Self> {
        let index = usize::from(id).checked_sub(1)?;
        Self::ALL.get(index).copied()
    }

    /// Lowercase name, used as the first path segment
    pub const fn name(self) -> &'static str {
        match self {
            DeviceId::Dht22 => "dht22",
            DeviceId::Mics6814 => "mics6814",
            DeviceId::Ky038 => "ky038",
            DeviceId::Gy87 => "gy87",
            DeviceId::Ccs811 => "ccs811",
            DeviceId::PmSds011 => "sds011",
            DeviceId::Battery => "battery",
        }
    }

    /// Look up a device by [`DeviceId::name`]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|d| d.name() == name)
    }

    /// Human-readable description
    pub const fn label(self) -> &'static str {
        match self {
            DeviceId::Dht22 => "DHT22 temperature/humidity",
            DeviceId::Mics6814 => "MiCS-6814 gas",
            DeviceId::Ky038 => "KY-038/HW-038 sound and light",
            DeviceId::Gy87 => "GY-87 IMU/barometer",
            DeviceId::Ccs811 => "CCS811 air quality",
            DeviceId::PmSds011 => "SDS011 particulate matter",
            DeviceId::Battery => "battery monitor",
        }
    }
}
