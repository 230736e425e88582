use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use stockcost_core::{Entity, MoveLineId, StockMoveId};

use crate::stock_move::MoveState;

/// The editable unit of a move: one done quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveLine {
    pub id: MoveLineId,
    pub move_id: StockMoveId,
    pub qty_done: Decimal,
    pub state: MoveState,
}

impl Entity for MoveLine {
    type Id = MoveLineId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Field changes requested for a set of move lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveLineWrite {
    pub qty_done: Option<Decimal>,
}

impl MoveLineWrite {
    pub fn qty_done(qty_done: Decimal) -> Self {
        Self {
            qty_done: Some(qty_done),
        }
    }

    pub fn apply_to(&self, line: &mut MoveLine) {
        if let Some(qty) = self.qty_done {
            line.qty_done = qty;
        }
    }
}
