//! Pot-odds arithmetic over an equity figure. Amounts are in any common
//! unit (chips, big blinds).

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Decision {
    Check,
    Call,
    Fold,
}

/// Share of the final pot the caller puts in: `call / (pot + call)`.
/// Zero when there is nothing to call.
pub fn pot_odds(pot: f64, call: f64) -> f64 {
    let total = pot + call;
    if total <= 0.0 {
        return 0.0;
    }
    call / total
}

/// Expected value of calling: win `pot + call` with `equity`, lose `call`
/// otherwise.
pub fn expected_value(equity: f64, pot: f64, call: f64) -> f64 {
    equity * (pot + call) - (1.0 - equity) * call
}

/// Equity at which calling is break-even.
pub fn breakeven_equity(pot: f64, call: f64) -> f64 {
    pot_odds(pot, call)
}

/// Check when free, call when the call has positive EV, fold otherwise.
pub fn decide(equity: f64, pot: f64, call: f64) -> Decision {
    if call == 0.0 {
        Decision::Check
    } else if expected_value(equity, pot, call) > 0.0 {
        Decision::Call
    } else {
        Decision::Fold
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Advice {
    pub decision: Decision,
    pub equity: f64,
    pub pot_odds: f64,
    pub ev: f64,
}

impl Advice {
    pub fn new(equity: f64, pot: f64, call: f64) -> Self {
        Self {
            decision: decide(equity, pot, call),
            equity,
            pot_odds: pot_odds(pot, call),
            ev: expected_value(equity, pot, call),
        }
    }

    pub fn profitable(&self) -> bool {
        self.ev > 0.0
    }
}
