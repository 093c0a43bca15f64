//! Master data definitions: departments, products, fault profiles.
//!
//! Alarm codes are dispatched on an explicit `FaultProfile` carried by each
//! product rather than on the product's name.

use crate::error::{FabError, FabResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlarmSpec {
    pub code:        &'static str,
    pub description: &'static str,
}

impl AlarmSpec {
    /// Inverse of `FaultProfile::alarm` over alarm codes.
    pub fn lookup(code: &str) -> Option<(FaultProfile, AlarmSpec)> {
        FaultProfile::ALL
            .iter()
            .map(|f| (*f, f.alarm()))
            .find(|(_, spec)| spec.code == code)
    }
}

/// How a product tends to break the machines it runs on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultProfile {
    MotorOverload,
    DustBlockage,
    Overheat,
    #[default]
    General,
}

impl FaultProfile {
    pub const ALL: [FaultProfile; 4] = [
        Self::MotorOverload,
        Self::DustBlockage,
        Self::Overheat,
        Self::General,
    ];

    pub fn alarm(&self) -> AlarmSpec {
        match self {
            Self::MotorOverload => AlarmSpec {
                code:        "A02",
                description: "Motor overload (hard material)",
            },
            Self::DustBlockage => AlarmSpec {
                code:        "A10",
                description: "Photocell blocked (dust)",
            },
            Self::Overheat => AlarmSpec {
                code:        "A04",
                description: "Temperature high (melt warning)",
            },
            Self::General => AlarmSpec {
                code:        "A99",
                description: "General machine fault",
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentSpec {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSpec {
    pub name:            String,
    /// Ordinal 1–5; drives alarm probability.
    pub difficulty:      u8,
    pub ideal_rate_kg_h: i64,
    /// Dust-prone products draw scrap from the elevated range.
    #[serde(default)]
    pub dust_prone:      bool,
    #[serde(default)]
    pub fault:           FaultProfile,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Catalog {
    pub departments:             Vec<DepartmentSpec>,
    pub products:                Vec<ProductSpec>,
    pub customers:               Vec<String>,
    pub machines_per_department: u32,
    pub machine_name_prefix:     String,
}

impl Catalog {
    pub fn standard() -> Self {
        let departments = ["Intake", "Mixing", "Press", "Packing", "Dispatch"]
            .into_iter()
            .map(|name| DepartmentSpec { name: name.into() })
            .collect();

        let product = |name: &str, difficulty, ideal_rate_kg_h, dust_prone, fault| ProductSpec {
            name: name.into(),
            difficulty,
            ideal_rate_kg_h,
            dust_prone,
            fault,
        };
        let products = vec![
            product("Chewy Gummy Men", 5, 800, false, FaultProfile::MotorOverload),
            product("Raspberry Boats", 3, 1000, false, FaultProfile::General),
            product("Thunder Licorice", 4, 900, false, FaultProfile::General),
            product("Sour Sparks", 2, 1200, true, FaultProfile::DustBlockage),
            product("Choco Crunch", 3, 950, false, FaultProfile::Overheat),
        ];

        let customers = [
            "Candy Wholesale Ltd",
            "Sweet Things",
            "CinemaCandy",
            "Kiosk King",
            "MegaMart",
        ]
        .into_iter()
        .map(String::from)
        .collect();

        Self {
            departments,
            products,
            customers,
            machines_per_department: 5,
            machine_name_prefix: "Machine".into(),
        }
    }

    /// Machine names are `{prefix}_{deptId}_{index}`, index starting at 1.
    pub fn machine_name(&self, dept_id: i64, index: u32) -> String {
        format!("{}_{}_{}", self.machine_name_prefix, dept_id, index)
    }

    pub fn validate(&self) -> FabResult<()> {
        if self.departments.is_empty() {
            return Err(FabError::Config("catalog has no departments".into()));
        }
        if self.products.is_empty() {
            return Err(FabError::Config("catalog has no products".into()));
        }
        if self.customers.is_empty() {
            return Err(FabError::Config("catalog has no customers".into()));
        }
        if self.machines_per_department == 0 {
            return Err(FabError::Config("machines_per_department must be > 0".into()));
        }
        for p in &self.products {
            if !(1..=5).contains(&p.difficulty) {
                return Err(FabError::Config(format!(
                    "product '{}': difficulty {} outside 1..=5",
                    p.name, p.difficulty
                )));
            }
            if p.ideal_rate_kg_h <= 0 {
                return Err(FabError::Config(format!(
                    "product '{}': ideal rate must be positive",
                    p.name
                )));
            }
        }
        if self.products.iter().filter(|p| p.dust_prone).count() > 1 {
            return Err(FabError::Config("at most one product may be dust-prone".into()));
        }
        Ok(())
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_catalog_is_valid() {
        let catalog = Catalog::standard();
        catalog.validate().unwrap();
        assert_eq!(catalog.departments.len(), 5);
        assert_eq!(catalog.products.len(), 5);
        assert_eq!(catalog.products.iter().filter(|p| p.dust_prone).count(), 1);
    }

    #[test]
    fn fault_lookup_round_trips_every_code() {
        for fault in FaultProfile::ALL {
            let spec = fault.alarm();
            let (found, _) = AlarmSpec::lookup(spec.code).unwrap();
            assert_eq!(found, fault);
        }
        assert!(AlarmSpec::lookup("Z00").is_none());
    }

    #[test]
    fn missing_fault_falls_back_to_general() {
        let p: ProductSpec = serde_json::from_str(
            r#"{"name":"Fizz","difficulty":1,"ideal_rate_kg_h":700}"#,
        )
        .unwrap();
        assert_eq!(p.fault, FaultProfile::General);
        assert!(!p.dust_prone);
    }

    #[test]
    fn rejects_out_of_range_difficulty() {
        let mut catalog = Catalog::standard();
        catalog.products[0].difficulty = 6;
        assert!(catalog.validate().is_err());
    }

    #[test]
    fn machine_names_embed_department_and_index() {
        assert_eq!(Catalog::standard().machine_name(3, 2), "Machine_3_2");
    }
}
