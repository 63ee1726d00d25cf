pub mod initialize;
pub mod create_market;
pub mod place_bet;
pub mod update_price;
pub mod resolve_market;
pub mod claim_winnings;

pub use initialize::*;
pub use create_market::*;
pub use place_bet::*;
pub use update_price::*;
pub use resolve_market::*;
pub use claim_winnings::*;
