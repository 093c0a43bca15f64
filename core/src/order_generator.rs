use crate::{
    config::SimulationParams,
    error::{FabError, FabResult},
    event::HistoryEvent,
    generator::{DayGenerator, SimDay},
    rng::StreamRng,
    seeder::MasterData,
    store::{FactoryStore, OrderRow, OrderStatus},
    types::ProductId,
};
use chrono::Duration;

/// At most one customer order per simulated day, past or future.
pub struct OrderGenerator {
    customers:   Vec<String>,
    product_ids: Vec<ProductId>,
    params:      SimulationParams,
    rng:         StreamRng,
}

impl OrderGenerator {
    pub fn new(
        customers: Vec<String>,
        master: &MasterData,
        params: SimulationParams,
        rng: StreamRng,
    ) -> Self {
        Self {
            customers,
            product_ids: master.products.iter().map(|p| p.product_id).collect(),
            params,
            rng,
        }
    }

    fn draw_order(&mut self, day: &SimDay) -> FabResult<OrderRow> {
        let customer = self
            .rng
            .pick(&self.customers)
            .cloned()
            .ok_or_else(|| FabError::Config("no customers configured".into()))?;
        let product_id = *self
            .rng
            .pick(&self.product_ids)
            .ok_or(FabError::MasterDataMissing { table: "Products" })?;
        let (lo, hi) = self.params.order_amount_kg;
        let amount_kg = self.rng.int_inclusive(lo, hi);
        let (lo, hi) = self.params.due_offset_days;
        let due_date = day.start + Duration::days(self.rng.int_inclusive(lo, hi));
        let status = if day.is_future() {
            OrderStatus::Pending
        } else {
            OrderStatus::Done
        };
        Ok(OrderRow {
            order_id: None,
            customer,
            product_id,
            amount_kg,
            due_date,
            status,
        })
    }
}

impl DayGenerator for OrderGenerator {
    fn name(&self) -> &'static str {
        "orders"
    }

    fn generate(&mut self, day: &SimDay, store: &FactoryStore) -> FabResult<Vec<HistoryEvent>> {
        if !self.rng.chance(self.params.order_probability) {
            return Ok(vec![]);
        }
        let order = self.draw_order(day)?;
        let order_id = store.insert_order(&order)?;
        Ok(vec![HistoryEvent::OrderPlaced {
            order_id,
            product_id: order.product_id,
            amount_kg: order.amount_kg,
            status: order.status,
        }])
    }
}
