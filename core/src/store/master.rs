use super::{DepartmentRow, FactoryStore, MachineRow, ProductRow};
use crate::{
    catalog::ProductSpec,
    error::FabResult,
    types::{DeptId, MachineId, ProductId},
};
use rusqlite::params;

impl FactoryStore {
    // ── Departments ───────────────────────────────────────────────

    pub fn insert_department(&self, name: &str) -> FabResult<DeptId> {
        self.conn
            .execute("INSERT INTO Departments (Name) VALUES (?1)", params![name])?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn departments(&self) -> FabResult<Vec<DepartmentRow>> {
        let mut stmt = self
            .conn
            .prepare("SELECT DeptID, Name FROM Departments ORDER BY DeptID")?;
        let rows = stmt
            .query_map([], |r| {
                Ok(DepartmentRow {
                    dept_id: r.get(0)?,
                    name:    r.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    // ── Products ──────────────────────────────────────────────────

    pub fn insert_product(&self, p: &ProductSpec) -> FabResult<ProductId> {
        self.conn.execute(
            "INSERT INTO Products (Name, DifficultyLevel, IdealSpeedKgH) VALUES (?1, ?2, ?3)",
            params![p.name, p.difficulty, p.ideal_rate_kg_h],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn products(&self) -> FabResult<Vec<ProductRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT ProductID, Name, DifficultyLevel, IdealSpeedKgH
             FROM Products ORDER BY ProductID",
        )?;
        let rows = stmt
            .query_map([], |r| {
                Ok(ProductRow {
                    product_id:      r.get(0)?,
                    name:            r.get(1)?,
                    difficulty:      r.get(2)?,
                    ideal_rate_kg_h: r.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    // ── Machines ──────────────────────────────────────────────────

    pub fn insert_machine(&self, dept_id: DeptId, name: &str) -> FabResult<MachineId> {
        self.conn.execute(
            "INSERT INTO Machines (DeptID, Name) VALUES (?1, ?2)",
            params![dept_id, name],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn machines(&self) -> FabResult<Vec<MachineRow>> {
        let mut stmt = self
            .conn
            .prepare("SELECT MachineID, DeptID, Name FROM Machines ORDER BY MachineID")?;
        let rows = stmt
            .query_map([], |r| {
                Ok(MachineRow {
                    machine_id: r.get(0)?,
                    dept_id:    r.get(1)?,
                    name:       r.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn machine(&self, machine_id: MachineId) -> FabResult<Option<MachineRow>> {
        use rusqlite::OptionalExtension;
        let row = self
            .conn
            .query_row(
                "SELECT MachineID, DeptID, Name FROM Machines WHERE MachineID = ?1",
                params![machine_id],
                |r| {
                    Ok(MachineRow {
                        machine_id: r.get(0)?,
                        dept_id:    r.get(1)?,
                        name:       r.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(row)
    }
}
