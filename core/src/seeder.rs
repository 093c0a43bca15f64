//! Master-data seeding and the provisioning entry point.
//!
//! Provisioning runs once at startup:
//!   schema → row-count guard → (reset + master data + history) or nothing.

use crate::{
    catalog::{Catalog, FaultProfile},
    clock::WallClock,
    config::FactoryConfig,
    engine::HistorySimulator,
    error::FabResult,
    event::GenerationSummary,
    store::{DepartmentRow, FactoryStore, MachineRow},
    types::ProductId,
};
use serde::{Deserialize, Serialize};

/// A seeded product joined with the catalog attributes the store does not
/// persist. Alarm codes are looked up from `fault` by product identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductProfile {
    pub product_id:      ProductId,
    pub name:            String,
    pub difficulty:      u8,
    pub ideal_rate_kg_h: i64,
    pub dust_prone:      bool,
    pub fault:           FaultProfile,
}

/// Reference rows the history simulator draws from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MasterData {
    pub departments: Vec<DepartmentRow>,
    pub machines:    Vec<MachineRow>,
    pub products:    Vec<ProductProfile>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ProvisionOutcome {
    /// The guard held; nothing was written.
    AlreadyPopulated { production_rows: i64 },
    Seeded(GenerationSummary),
}

/// True when the production history is below `threshold` rows.
pub fn needs_reseed(store: &FactoryStore, threshold: i64) -> FabResult<bool> {
    Ok(store.production_count()? < threshold)
}

/// Insert departments, products, then machines per department.
/// Expects empty tables.
pub fn seed_master_data(store: &FactoryStore, catalog: &Catalog) -> FabResult<MasterData> {
    catalog.validate()?;

    let mut departments = Vec::with_capacity(catalog.departments.len());
    for dept in &catalog.departments {
        let dept_id = store.insert_department(&dept.name)?;
        departments.push(DepartmentRow {
            dept_id,
            name: dept.name.clone(),
        });
    }

    let mut products = Vec::with_capacity(catalog.products.len());
    for spec in &catalog.products {
        let product_id = store.insert_product(spec)?;
        products.push(ProductProfile {
            product_id,
            name: spec.name.clone(),
            difficulty: spec.difficulty,
            ideal_rate_kg_h: spec.ideal_rate_kg_h,
            dust_prone: spec.dust_prone,
            fault: spec.fault,
        });
    }

    let mut machines = Vec::new();
    for dept in &departments {
        for index in 1..=catalog.machines_per_department {
            let name = catalog.machine_name(dept.dept_id, index);
            let machine_id = store.insert_machine(dept.dept_id, &name)?;
            machines.push(MachineRow {
                machine_id,
                dept_id: dept.dept_id,
                name,
            });
        }
    }

    log::info!(
        "Master data seeded: {} departments, {} products, {} machines",
        departments.len(),
        products.len(),
        machines.len()
    );
    Ok(MasterData {
        departments,
        machines,
        products,
    })
}

/// Initialize the schema and, if the guard trips, rebuild every table.
///
/// The clock is read once here; the whole history is generated against
/// that single reading.
pub fn provision(
    store: &FactoryStore,
    config: &FactoryConfig,
    clock: &dyn WallClock,
    seed: u64,
) -> FabResult<ProvisionOutcome> {
    store.migrate()?;
    config.simulation.validate()?;

    let threshold = config.simulation.reseed_threshold;
    if !needs_reseed(store, threshold)? {
        let production_rows = store.production_count()?;
        log::info!("Data already present ({production_rows} production rows); skipping seed");
        return Ok(ProvisionOutcome::AlreadyPopulated { production_rows });
    }

    let now = clock.now();
    log::info!("Production history below {threshold} rows; reseeding (seed = {seed})");

    store.begin_batch()?;
    let master = match store
        .reset_all()
        .and_then(|()| seed_master_data(store, &config.catalog))
    {
        Ok(master) => master,
        Err(e) => {
            if let Err(rollback) = store.rollback_batch() {
                log::warn!("Rollback after failed master seed also failed: {rollback}");
            }
            return Err(e);
        }
    };
    store.commit_batch()?;

    let mut simulator = HistorySimulator::build(config, &master, seed)?;
    let summary = simulator.run(store, now)?;
    Ok(ProvisionOutcome::Seeded(summary))
}
