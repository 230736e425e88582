//! Editing the done quantity of completed moves, end to end against the
//! in-memory backend.

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use stockcost_core::{
    CompanyContext, CompanyId, DomainError, MoveLineId, ProductId, ProductTemplateId, StockMoveId,
};
use stockcost_events::Event;
use stockcost_inventory::{
    AccountEntryOverrides, EditMoveLines, InMemoryStock, Location, MoveDirection, MoveLine,
    MoveLineWrite, MoveState, StockMove, ValuationEvent, write_move_lines,
};
use stockcost_products::{CostMethod, CostingSettings, ProductTemplate, ValuationMode};

struct World {
    stock: InMemoryStock,
    ctx: CompanyContext,
    product: ProductId,
    template_id: ProductTemplateId,
}

impl World {
    fn new(method: CostMethod, standard_price: Decimal) -> Self {
        stockcost_observability::init();
        let ctx = CompanyContext::new(CompanyId::new());
        let product = ProductId::new();
        let mut template =
            ProductTemplate::new(ProductTemplateId::new(), "Pallet", &CostingSettings::default())
                .with_variant(product);
        template.write_cost_method(ctx.company_id, method);
        template.set_standard_price(ctx.company_id, standard_price);
        let template_id = template.id_typed();

        let mut stock = InMemoryStock::default();
        stock.insert_template(template);
        Self {
            stock,
            ctx,
            product,
            template_id,
        }
    }

    fn real_time(mut self) -> Self {
        self.stock
            .template_mut(self.template_id)
            .unwrap()
            .set_valuation(ValuationMode::RealTime);
        self
    }

    fn add_move(
        &mut self,
        src: Location,
        dest: Location,
        qty: Decimal,
        price_unit: Decimal,
        value: Decimal,
        days_ago: i64,
    ) -> (StockMoveId, MoveLineId) {
        let company = self.ctx.company_id;
        let remaining = if dest.is_valued_for(company) && !src.is_valued_for(company) {
            qty
        } else {
            Decimal::ZERO
        };
        let mv = StockMove {
            id: StockMoveId::new(),
            product_id: self.product,
            company_id: self.ctx.company_id,
            location_src: src,
            location_dest: dest,
            state: MoveState::Done,
            date: Utc::now() - Duration::days(days_ago),
            price_unit,
            value,
            remaining_qty: remaining,
            remaining_value: remaining * price_unit,
        };
        let line = MoveLine {
            id: MoveLineId::new(),
            move_id: mv.id,
            qty_done: qty,
            state: MoveState::Done,
        };
        let ids = (mv.id, line.id);
        self.stock.insert_move(mv);
        self.stock.insert_line(line);
        ids
    }

    fn receipt(
        &mut self,
        qty: Decimal,
        price_unit: Decimal,
        days_ago: i64,
    ) -> (StockMoveId, MoveLineId) {
        let company = self.ctx.company_id;
        self.add_move(
            Location::supplier(),
            Location::internal(company),
            qty,
            price_unit,
            qty * price_unit,
            days_ago,
        )
    }

    fn delivery(&mut self, qty: Decimal, value: Decimal) -> (StockMoveId, MoveLineId) {
        let company = self.ctx.company_id;
        self.add_move(
            Location::internal(company),
            Location::customer(),
            qty,
            Decimal::ZERO,
            value,
            0,
        )
    }

    fn edit(
        &mut self,
        line_ids: &[MoveLineId],
        qty_done: Decimal,
    ) -> Result<Vec<ValuationEvent>, DomainError> {
        let cmd = EditMoveLines {
            line_ids: line_ids.to_vec(),
            write: MoveLineWrite::qty_done(qty_done),
            occurred_at: Utc::now(),
        };
        write_move_lines(&mut self.stock, &self.ctx, &cmd).map(|o| o.events)
    }

    fn value_of(&self, move_id: StockMoveId) -> Decimal {
        self.stock.move_by_id(move_id).unwrap().value
    }

    fn standard_price(&self) -> Decimal {
        self.stock
            .template(self.template_id)
            .unwrap()
            .standard_price(self.ctx.company_id)
    }
}

#[test]
fn standard_price_methods_add_to_incoming_value() {
    for method in [CostMethod::Standard, CostMethod::Average, CostMethod::Last] {
        let mut world = World::new(method, dec!(10));
        let (receipt, line) = world.receipt(dec!(5), dec!(10), 1);

        world.edit(&[line], dec!(7)).unwrap();

        assert_eq!(world.value_of(receipt), dec!(70), "{method}");
        assert_eq!(world.stock.line_by_id(line).unwrap().qty_done, dec!(7));
    }
}

#[test]
fn average_delivery_edit_from_five_to_eight_lowers_value_by_thirty() {
    let mut world = World::new(CostMethod::Average, dec!(10));
    world.receipt(dec!(20), dec!(10), 2);
    let (delivery, line) = world.delivery(dec!(5), dec!(-50));

    let events = world.edit(&[line], dec!(8)).unwrap();

    assert_eq!(world.value_of(delivery), dec!(-80));
    match &events[..] {
        [ValuationEvent::MoveRevalued(e)] => {
            assert_eq!(e.direction, MoveDirection::Outgoing);
            assert_eq!(e.qty_difference, dec!(3));
            assert_eq!(e.correction_value, dec!(30));
            assert_eq!(e.value_before, dec!(-50));
            assert_eq!(e.value_after, dec!(-80));
        }
        other => panic!("expected one MoveRevalued, got {other:?}"),
    }
    // Manual valuation: no accounting entry. Positive change: price propagation.
    assert!(world.stock.account_entries().is_empty());
    assert_eq!(world.stock.price_updates().len(), 1);
    assert_eq!(world.stock.price_updates()[0].forced_qty, dec!(3));
}

#[test]
fn standard_price_decrease_on_delivery_gives_value_back() {
    let mut world = World::new(CostMethod::Standard, dec!(4));
    let (delivery, line) = world.delivery(dec!(5), dec!(-20));

    world.edit(&[line], dec!(2)).unwrap();

    assert_eq!(world.value_of(delivery), dec!(-8));
    assert!(world.stock.price_updates().is_empty());
}

#[test]
fn real_time_valuation_posts_forced_amounts() {
    let mut world = World::new(CostMethod::Standard, dec!(10)).real_time();
    let (receipt, line) = world.receipt(dec!(5), dec!(10), 1);

    world.edit(&[line], dec!(3)).unwrap();

    let entries = world.stock.account_entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].move_id, receipt);
    assert_eq!(entries[0].company_id, world.ctx.company_id);
    assert_eq!(
        entries[0].overrides,
        AccountEntryOverrides {
            force_valuation_amount: dec!(-20),
            forced_quantity: dec!(-2),
        }
    );
}

#[test]
fn fifo_receipt_edit_moves_value_and_layer_together() {
    let mut world = World::new(CostMethod::Fifo, dec!(99));
    let (receipt, line) = world.receipt(dec!(5), dec!(4), 1);

    world.edit(&[line], dec!(8)).unwrap();

    let mv = world.stock.move_by_id(receipt).unwrap();
    assert_eq!(mv.value, dec!(32));
    assert_eq!(mv.remaining_qty, dec!(8));
    assert_eq!(mv.remaining_value, dec!(32));
    assert_eq!(mv.remaining_value, mv.remaining_qty * mv.price_unit);
}

#[test]
fn fifo_delivery_increase_consumes_exactly_the_difference() {
    let mut world = World::new(CostMethod::Fifo, dec!(99));
    let (old, _) = world.receipt(dec!(2), dec!(5), 3);
    let (new, _) = world.receipt(dec!(10), dec!(7), 1);
    let (delivery, line) = world.delivery(dec!(1), dec!(-5));

    world.edit(&[line], dec!(4)).unwrap();

    assert_eq!(world.stock.fifo_runs(), &[(delivery, dec!(3))]);
    // 2 @ 5 from the old layer, 1 @ 7 from the new one.
    assert_eq!(world.value_of(delivery), dec!(-22));
    assert_eq!(world.stock.move_by_id(old).unwrap().remaining_qty, Decimal::ZERO);
    assert_eq!(world.stock.move_by_id(new).unwrap().remaining_qty, dec!(9));
    assert_eq!(world.stock.move_by_id(new).unwrap().remaining_value, dec!(63));
}

#[test]
fn fifo_delivery_decrease_returns_units_to_latest_receipt() {
    let mut world = World::new(CostMethod::Fifo, dec!(99));
    let (older, _) = world.receipt(dec!(4), dec!(5), 3);
    let (latest, _) = world.receipt(dec!(1), dec!(6), 1);
    let (delivery, line) = world.delivery(dec!(4), dec!(-22));

    let events = world.edit(&[line], dec!(1)).unwrap();

    let latest_after = world.stock.move_by_id(latest).unwrap();
    assert_eq!(latest_after.remaining_qty, dec!(4));
    assert_eq!(latest_after.remaining_value, dec!(24));
    assert_eq!(world.stock.move_by_id(older).unwrap().remaining_qty, dec!(4));
    assert_eq!(world.value_of(delivery), dec!(-4));

    assert!(events.iter().any(|e| matches!(
        e,
        ValuationEvent::ReceiptLayerRestored(r)
            if r.receipt_id == latest && r.qty == dec!(3) && r.value == dec!(18)
    )));
    assert!(world.stock.price_updates().is_empty());
}

#[test]
fn fifo_delivery_decrease_without_receipts_uses_standard_price() {
    let mut world = World::new(CostMethod::Fifo, dec!(9));
    let (delivery, line) = world.delivery(dec!(3), dec!(-27));

    world.edit(&[line], dec!(1)).unwrap();

    assert_eq!(world.value_of(delivery), dec!(-9));
}

#[test]
fn internal_transfers_and_undone_lines_are_written_without_revaluation() {
    let mut world = World::new(CostMethod::Standard, dec!(10));
    let company = world.ctx.company_id;
    let (transfer, transfer_line) = world.add_move(
        Location::internal(company),
        Location::internal(company),
        dec!(5),
        dec!(10),
        Decimal::ZERO,
        0,
    );
    let (receipt, _) = world.receipt(dec!(5), dec!(10), 1);
    let pending_line = MoveLine {
        id: MoveLineId::new(),
        move_id: receipt,
        qty_done: dec!(1),
        state: MoveState::Assigned,
    };
    let pending_id = pending_line.id;
    world.stock.insert_line(pending_line);

    let events = world.edit(&[transfer_line, pending_id], dec!(9)).unwrap();

    assert!(events.is_empty());
    assert_eq!(world.value_of(transfer), Decimal::ZERO);
    assert_eq!(world.value_of(receipt), dec!(50));
    assert_eq!(world.stock.line_by_id(transfer_line).unwrap().qty_done, dec!(9));
    assert_eq!(world.stock.line_by_id(pending_id).unwrap().qty_done, dec!(9));
}

#[test]
fn done_line_of_a_move_not_yet_done_is_written_without_revaluation() {
    let mut world = World::new(CostMethod::Standard, dec!(10));
    let company = world.ctx.company_id;
    let assigned = StockMove {
        id: StockMoveId::new(),
        product_id: world.product,
        company_id: company,
        location_src: Location::supplier(),
        location_dest: Location::internal(company),
        state: MoveState::Assigned,
        date: Utc::now(),
        price_unit: dec!(10),
        value: dec!(40),
        remaining_qty: dec!(4),
        remaining_value: dec!(40),
    };
    let line = MoveLine {
        id: MoveLineId::new(),
        move_id: assigned.id,
        qty_done: dec!(4),
        state: MoveState::Done,
    };
    let (move_id, line_id) = (assigned.id, line.id);
    world.stock.insert_move(assigned);
    world.stock.insert_line(line);

    let events = world.edit(&[line_id], dec!(6)).unwrap();

    assert!(events.is_empty());
    assert_eq!(world.value_of(move_id), dec!(40));
    assert!(world.stock.account_entries().is_empty());
    assert!(world.stock.price_updates().is_empty());
    assert_eq!(world.stock.line_by_id(line_id).unwrap().qty_done, dec!(6));
}

#[test]
fn lines_of_one_move_are_summed() {
    let mut world = World::new(CostMethod::Standard, dec!(10));
    let (receipt, first) = world.receipt(dec!(2), dec!(10), 1);
    let second = MoveLine {
        id: MoveLineId::new(),
        move_id: receipt,
        qty_done: dec!(3),
        state: MoveState::Done,
    };
    let second_id = second.id;
    world.stock.insert_line(second);
    world
        .stock
        .template_mut(world.template_id)
        .unwrap()
        .set_valuation(ValuationMode::RealTime);

    // 2 -> 4 and 3 -> 4: three more units on one move.
    let events = world.edit(&[first, second_id], dec!(4)).unwrap();

    assert_eq!(events.len(), 1);
    assert_eq!(world.value_of(receipt), dec!(20) + dec!(30));
    assert_eq!(world.stock.account_entries().len(), 1);
    assert_eq!(world.stock.account_entries()[0].overrides.forced_quantity, dec!(3));
}

#[test]
fn unchanged_quantity_is_not_revalued() {
    let mut world = World::new(CostMethod::Standard, dec!(10)).real_time();
    let (receipt, line) = world.receipt(dec!(5), dec!(10), 1);

    let events = world.edit(&[line], dec!(5)).unwrap();

    assert!(events.is_empty());
    assert_eq!(world.value_of(receipt), dec!(50));
    assert!(world.stock.account_entries().is_empty());
}

#[test]
fn writes_without_done_quantity_skip_revaluation() {
    let mut world = World::new(CostMethod::Standard, dec!(10));
    let (receipt, line) = world.receipt(dec!(5), dec!(10), 1);
    let cmd = EditMoveLines {
        line_ids: vec![line],
        write: MoveLineWrite::default(),
        occurred_at: Utc::now(),
    };

    let outcome = write_move_lines(&mut world.stock, &world.ctx, &cmd).unwrap();

    assert!(outcome.events.is_empty());
    assert_eq!(world.value_of(receipt), dec!(50));
    assert_eq!(world.stock.line_by_id(line).unwrap().qty_done, dec!(5));
}

#[test]
fn last_purchase_price_follows_receipt_increase() {
    let mut world = World::new(CostMethod::Last, dec!(10));
    let (_, line) = world.receipt(dec!(5), dec!(12), 1);

    world.edit(&[line], dec!(6)).unwrap();

    assert_eq!(world.standard_price(), dec!(12));
    let update = &world.stock.price_updates()[0];
    assert_eq!(update.standard_price_before, dec!(10));
    assert_eq!(update.standard_price_after, dec!(12));
}

#[test]
fn accounting_failure_aborts_before_the_base_write() {
    let mut world = World::new(CostMethod::Standard, dec!(10)).real_time();
    world.stock.fail_accounting_with("journal locked");
    let (_, line) = world.receipt(dec!(5), dec!(10), 1);

    let err = world.edit(&[line], dec!(6)).unwrap_err();

    assert_eq!(err, DomainError::Collaborator("journal locked".to_string()));
    assert_eq!(world.stock.line_by_id(line).unwrap().qty_done, dec!(5));
}

#[test]
fn unknown_line_is_not_found() {
    let mut world = World::new(CostMethod::Standard, dec!(10));

    let err = world.edit(&[MoveLineId::new()], dec!(1)).unwrap_err();

    assert!(matches!(err, DomainError::NotFound(_)));
}

#[test]
fn outcome_envelopes_are_numbered_in_order() {
    let mut world = World::new(CostMethod::Fifo, dec!(99));
    world.receipt(dec!(4), dec!(5), 1);
    let (_, line) = world.delivery(dec!(4), dec!(-20));
    let cmd = EditMoveLines {
        line_ids: vec![line],
        write: MoveLineWrite::qty_done(dec!(2)),
        occurred_at: Utc::now(),
    };

    let outcome = write_move_lines(&mut world.stock, &world.ctx, &cmd).unwrap();
    assert_eq!(outcome.revalued_moves().count(), 1);
    let envelopes = outcome.into_envelopes(&world.ctx);

    let kinds: Vec<(u64, &str)> = envelopes
        .iter()
        .map(|e| (e.sequence_number(), e.payload().event_type()))
        .collect();
    assert_eq!(
        kinds,
        vec![
            (1, "stock.move.revalued"),
            (2, "stock.move.receipt_layer_restored"),
        ]
    );
}
