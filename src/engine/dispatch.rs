use rand::Rng;

use crate::models::driver::Driver;

const SIMULATED_DRIVERS: [(&str, f64, &str, &str, &str); 4] = [
    ("John Smith", 4.95, "Toyota Camry - White", "ABC 123", "+1 (555) 123-4567"),
    ("Maria Lopez", 4.88, "Honda Accord - Silver", "7XYZ 482", "+1 (555) 987-1203"),
    ("Wei Chen", 4.91, "Tesla Model 3 - Black", "8TES 301", "+1 (555) 442-8810"),
    ("Amara Okafor", 4.79, "Toyota Prius - Blue", "6PRI 552", "+1 (555) 310-7764"),
];

const DEFAULT_AVATAR: &str = "sf:person.circle.fill";

/// Locally simulated driver pool standing in for a matching backend.
#[derive(Debug, Clone)]
pub struct DriverRoster {
    drivers: Vec<Driver>,
}

impl Default for DriverRoster {
    fn default() -> Self {
        let drivers = SIMULATED_DRIVERS
            .iter()
            .map(|&(name, rating, vehicle, plate, phone)| Driver {
                name: name.to_string(),
                rating,
                vehicle: vehicle.to_string(),
                license_plate: plate.to_string(),
                phone: phone.to_string(),
                avatar: DEFAULT_AVATAR.to_string(),
            })
            .collect();

        Self { drivers }
    }
}

impl DriverRoster {
    pub fn assign<R: Rng>(&self, rng: &mut R) -> Driver {
        let index = rng.gen_range(0..self.drivers.len());
        let mut driver = self.drivers[index].clone();
        driver.rating = driver.rating.clamp(0.0, 5.0);
        driver
    }
}
