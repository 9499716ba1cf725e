pub mod campaigns;
pub mod emails;
pub mod export;
pub mod query;
