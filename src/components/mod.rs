pub mod scorebug;
pub mod team_card;
