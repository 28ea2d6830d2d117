use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Driver {
    pub name: String,
    pub rating: f64,
    pub vehicle: String,
    pub license_plate: String,
    pub phone: String,
    pub avatar: String,
}

/// What the rider needs to place a call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverContact {
    pub name: String,
    pub phone: String,
}

impl Driver {
    pub fn contact(&self) -> DriverContact {
        DriverContact {
            name: self.name.clone(),
            phone: self.phone.clone(),
        }
    }

    /// Label shown on the driver's map marker.
    pub fn marker_label(&self) -> String {
        format!("{} - {}", self.name, self.vehicle)
    }
}
