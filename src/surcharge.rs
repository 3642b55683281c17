use crate::types::AdditionalServices;
use serde::{Deserialize, Serialize};

bitflags::bitflags! {
    #[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ServiceFlags: u8 {
        const INSURANCE = 1 << 0;
        const PRIORITY = 1 << 1;
        const PACKAGING = 1 << 2;
        const INSPECTION = 1 << 3;
        const CUSTOMS_CLEARANCE = 1 << 4;
        const DOOR_TO_DOOR = 1 << 5;
        const STORAGE = 1 << 6;
    }
}

impl ServiceFlags {
    /// Services the legacy forwarder path never priced.
    pub const PLATFORM_ONLY: ServiceFlags = ServiceFlags::CUSTOMS_CLEARANCE
        .union(ServiceFlags::DOOR_TO_DOOR)
        .union(ServiceFlags::STORAGE);
}

impl From<&AdditionalServices> for ServiceFlags {
    fn from(value: &AdditionalServices) -> Self {
        let mut flags = ServiceFlags::empty();
        flags.set(ServiceFlags::INSURANCE, value.insurance);
        flags.set(ServiceFlags::PRIORITY, value.priority);
        flags.set(ServiceFlags::PACKAGING, value.packaging);
        flags.set(ServiceFlags::INSPECTION, value.inspection);
        flags.set(ServiceFlags::CUSTOMS_CLEARANCE, value.customs_clearance);
        flags.set(ServiceFlags::DOOR_TO_DOOR, value.door_to_door);
        flags.set(ServiceFlags::STORAGE, value.storage);
        flags
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Surcharge {
    Insurance,
    Priority,
    Packaging,
    Inspection,
    CustomsClearance,
    DoorToDoor,
    Storage,
}

const SURCHARGE_ORDER: [(ServiceFlags, Surcharge); 7] = [
    (ServiceFlags::INSURANCE, Surcharge::Insurance),
    (ServiceFlags::PRIORITY, Surcharge::Priority),
    (ServiceFlags::PACKAGING, Surcharge::Packaging),
    (ServiceFlags::INSPECTION, Surcharge::Inspection),
    (ServiceFlags::CUSTOMS_CLEARANCE, Surcharge::CustomsClearance),
    (ServiceFlags::DOOR_TO_DOOR, Surcharge::DoorToDoor),
    (ServiceFlags::STORAGE, Surcharge::Storage),
];

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct SurchargeLine {
    pub service: Surcharge,
    pub amount: f64,
}

/// Fee constants for the optional services, all in the base currency.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SurchargeSchedule {
    pub insurance_rate: f64,
    pub insurance_minimum: f64,
    pub priority_fee: f64,
    pub packaging_fee: f64,
    pub inspection_fee: f64,
    pub customs_clearance_fee: f64,
    pub door_to_door_fee: f64,
    pub storage_fee: f64,
}

impl Default for SurchargeSchedule {
    fn default() -> Self {
        Self {
            insurance_rate: 0.05,
            insurance_minimum: 50.0,
            priority_fee: 150.0,
            packaging_fee: 75.0,
            inspection_fee: 100.0,
            customs_clearance_fee: 200.0,
            door_to_door_fee: 300.0,
            storage_fee: 50.0,
        }
    }
}

impl SurchargeSchedule {
    /// Insurance premium on the declared value. An absent or non-positive
    /// declared value yields no premium at all, not the floor.
    pub fn insurance_premium(&self, cargo_value: Option<f64>) -> f64 {
        match cargo_value {
            Some(value) if value > 0.0 => (value * self.insurance_rate).max(self.insurance_minimum),
            _ => 0.0,
        }
    }

    fn amount_for(&self, service: Surcharge, cargo_value: Option<f64>) -> f64 {
        match service {
            Surcharge::Insurance => self.insurance_premium(cargo_value),
            Surcharge::Priority => self.priority_fee,
            Surcharge::Packaging => self.packaging_fee,
            Surcharge::Inspection => self.inspection_fee,
            Surcharge::CustomsClearance => self.customs_clearance_fee,
            Surcharge::DoorToDoor => self.door_to_door_fee,
            Surcharge::Storage => self.storage_fee,
        }
    }

    pub fn breakdown(&self, selected: ServiceFlags, cargo_value: Option<f64>) -> Vec<SurchargeLine> {
        SURCHARGE_ORDER
            .iter()
            .filter(|(flag, _)| selected.contains(*flag))
            .map(|(_, service)| SurchargeLine {
                service: *service,
                amount: self.amount_for(*service, cargo_value),
            })
            .filter(|line| line.amount != 0.0)
            .collect()
    }

    pub fn compute(&self, selected: ServiceFlags, cargo_value: Option<f64>) -> f64 {
        self.breakdown(selected, cargo_value)
            .iter()
            .map(|line| line.amount)
            .sum()
    }

    pub fn validate(&self) -> Result<(), String> {
        let fields = [
            ("insurance_rate", self.insurance_rate),
            ("insurance_minimum", self.insurance_minimum),
            ("priority_fee", self.priority_fee),
            ("packaging_fee", self.packaging_fee),
            ("inspection_fee", self.inspection_fee),
            ("customs_clearance_fee", self.customs_clearance_fee),
            ("door_to_door_fee", self.door_to_door_fee),
            ("storage_fee", self.storage_fee),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(format!("{name} must be a non-negative number, got {value}"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_follow_toggles() {
        let services = AdditionalServices {
            insurance: true,
            storage: true,
            ..Default::default()
        };
        let flags = ServiceFlags::from(&services);
        assert_eq!(flags, ServiceFlags::INSURANCE | ServiceFlags::STORAGE);
        assert!(flags.intersects(ServiceFlags::PLATFORM_ONLY));
    }

    #[test]
    fn zero_declared_value_carries_no_premium() {
        let schedule = SurchargeSchedule::default();
        assert_eq!(schedule.insurance_premium(Some(0.0)), 0.0);
        assert_eq!(schedule.insurance_premium(None), 0.0);
        assert_eq!(schedule.insurance_premium(Some(10_000.0)), 500.0);
    }

    #[test]
    fn negative_fee_is_rejected() {
        let schedule = SurchargeSchedule {
            storage_fee: -1.0,
            ..Default::default()
        };
        assert!(schedule.validate().unwrap_err().contains("storage_fee"));
    }
}
